//! Categories listing page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, get_categories},
    endpoints,
    html::{
        CARD_STYLE, LINK_STYLE, LIST_ITEM_STYLE, PAGE_CONTAINER_STYLE, base, category_icon,
        delete_button, link,
    },
    navigation::NavBar,
};

/// The state needed for the categories listing page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the user's categories, newest first.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(categories_view(&categories).into_response())
}

fn category_row(category: &Category) -> Markup {
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_CATEGORY, category.id);
    let confirm_message = format!(
        "Delete '{}'? Expenses in this category will become uncategorized.",
        category.name
    );

    html! {
        li class=(LIST_ITEM_STYLE)
        {
            (category_icon(category.icon.as_ref(), category.color.as_ref()))

            span class="flex-1 font-medium truncate" { (category.name) }

            (delete_button(&delete_url, &confirm_message, "closest li"))
        }
    }
}

fn categories_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Categories" }

                    a href=(endpoints::NEW_CATEGORY_VIEW) class=(LINK_STYLE)
                    {
                        "Create Category"
                    }
                }

                @if categories.is_empty() {
                    p class=(CARD_STYLE)
                    {
                        "No categories yet. "
                        (link(endpoints::NEW_CATEGORY_VIEW, "Create your first category"))
                        " to group your expenses."
                    }
                } @else {
                    ul id="categories" class={ (CARD_STYLE) " !p-0 divide-y divide-gray-200 dark:divide-gray-700" }
                    {
                        @for category in categories {
                            (category_row(category))
                        }
                    }
                }
            }
        }
    };

    base("Categories", &[], &content)
}
