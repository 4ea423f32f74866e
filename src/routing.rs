//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_new_category_page,
    },
    dashboard::{get_dashboard_page, get_dashboard_stats, update_display_currency_endpoint},
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expenses_page, get_new_expense_page,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::NEW_CATEGORY_VIEW, get(get_new_category_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // HTMX requests need the HX-Redirect header for auth redirects to replace the whole page.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::DASHBOARD_STATS, get(get_dashboard_stats))
            .route(
                endpoints::DISPLAY_CURRENCY,
                post(update_display_currency_endpoint),
            )
            .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
            .route(endpoints::DELETE_EXPENSE, delete(delete_expense_endpoint))
            .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
            .route(endpoints::DELETE_CATEGORY, delete(delete_category_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
