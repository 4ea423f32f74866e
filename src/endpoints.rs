//! The URIs of the pages and API endpoints.
//!
//! Paths with a parameter, e.g. '/api/expenses/{expense_id}', should be
//! filled in with [format_endpoint].

/// Redirects to the dashboard or the log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users with their spending summary.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The fragment containing the summary cards and category chart.
pub const DASHBOARD_STATS: &str = "/api/dashboard/stats";
/// The route for saving the currency the dashboard shows totals in.
pub const DISPLAY_CURRENCY: &str = "/api/preferences/currency";

/// The page listing a user's most recent expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for recording a new expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The route for creating expenses.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route for deleting a single expense.
pub const DELETE_EXPENSE: &str = "/api/expenses/{expense_id}";

/// The page listing a user's categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for creating a new category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The route for creating categories.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route for deleting a single category.
pub const DELETE_CATEGORY: &str = "/api/categories/{category_id}";

/// The page for logging in.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route that checks credentials and sets the auth cookie.
pub const LOG_IN_API: &str = "/api/log_in";
/// The page for creating an account.
pub const REGISTER_VIEW: &str = "/register";
/// The route for creating users.
pub const USERS: &str = "/api/users";
/// The route that clears the auth cookie.
pub const LOG_OUT: &str = "/log_out";

/// The page shown when something unexpectedly went wrong on the server.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The directory that static files are served from.
pub const STATIC: &str = "/static";

/// Replace the first parameter in `endpoint_path` with `id`.
///
/// A parameter is a name surrounded by braces, e.g. `{expense_id}`.
/// Paths without a parameter are returned unchanged.
///
/// ```ignore
/// assert_eq!(format_endpoint(DELETE_EXPENSE, 42), "/api/expenses/42");
/// ```
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{id}{}",
        &endpoint_path[..param_start],
        &endpoint_path[param_end..]
    )
}

// Router paths and redirects are parsed as URIs, so they must all be valid.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    #[track_caller]
    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::DASHBOARD_VIEW,
            endpoints::DASHBOARD_STATS,
            endpoints::DISPLAY_CURRENCY,
            endpoints::EXPENSES_VIEW,
            endpoints::NEW_EXPENSE_VIEW,
            endpoints::EXPENSES_API,
            endpoints::DELETE_EXPENSE,
            endpoints::CATEGORIES_VIEW,
            endpoints::NEW_CATEGORY_VIEW,
            endpoints::CATEGORIES_API,
            endpoints::DELETE_CATEGORY,
            endpoints::LOG_IN_VIEW,
            endpoints::LOG_IN_API,
            endpoints::REGISTER_VIEW,
            endpoints::USERS,
            endpoints::LOG_OUT,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::STATIC,
        ] {
            assert_endpoint_is_valid_uri(endpoint);
        }
    }

    #[test]
    fn formats_delete_routes() {
        assert_eq!(
            format_endpoint(endpoints::DELETE_EXPENSE, 7),
            "/api/expenses/7"
        );
        assert_eq!(
            format_endpoint(endpoints::DELETE_CATEGORY, 12),
            "/api/categories/12"
        );
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert_endpoint_is_valid_uri(&formatted_path);
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert_endpoint_is_valid_uri(&formatted_path);
    }
}
