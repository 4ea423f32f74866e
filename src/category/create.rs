//! Category creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{
        CategoryColor, CategoryIcon, CategoryName, create_category,
        domain::{COLOR_OPTIONS, CategoryFormData, EMOJI_OPTIONS},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_TILE_LABEL_STYLE,
        FORM_RADIO_TILE_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category creation page.
pub async fn get_new_category_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();
    let form = new_category_form(&CategoryFormData::default(), None);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="self-start mb-4 text-xl font-bold" { "Create New Category" }
            (form)
        }
    };

    base("Create Category", &[], &content).into_response()
}

/// Handle the category creation form.
///
/// A blank name is reported on the form. An icon or colour that was not
/// offered is reported as an alert.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            return new_category_form(&form, Some(&format!("Error: {error}"))).into_response();
        }
    };

    let (icon, color) = match (CategoryIcon::new(&form.icon), CategoryColor::new(&form.color)) {
        (Ok(icon), Ok(color)) => (icon, color),
        (Err(error), _) | (_, Err(error)) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(name, icon, color, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

impl Default for CategoryFormData {
    fn default() -> Self {
        Self {
            name: String::new(),
            icon: CategoryIcon::default().as_ref().to_owned(),
            color: CategoryColor::default().as_ref().to_owned(),
        }
    }
}

fn new_category_form(form: &CategoryFormData, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            @if let Some(error_message) = error_message {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Category Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Groceries"
                    value=(form.name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Icon" }

                div class="grid grid-cols-6 gap-2"
                {
                    @for (index, emoji) in EMOJI_OPTIONS.iter().enumerate() {
                        @let id = format!("icon-{index}");

                        div
                        {
                            input
                                type="radio"
                                name="icon"
                                id=(id)
                                value=(emoji)
                                checked[form.icon == *emoji]
                                class=(FORM_RADIO_TILE_STYLE);

                            label for=(id) class={ (FORM_RADIO_TILE_LABEL_STYLE) " text-xl" }
                            {
                                (emoji)
                            }
                        }
                    }
                }
            }

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Color" }

                div class="grid grid-cols-4 gap-2"
                {
                    @for (index, color) in COLOR_OPTIONS.iter().enumerate() {
                        @let id = format!("color-{index}");

                        div
                        {
                            input
                                type="radio"
                                name="color"
                                id=(id)
                                value=(color)
                                checked[form.color == *color]
                                class=(FORM_RADIO_TILE_STYLE);

                            label
                                for=(id)
                                class=(FORM_RADIO_TILE_LABEL_STYLE)
                                title=(color)
                                style={ "background-color: " (color) ";" }
                            {
                                span class="sr-only" { (color) }
                            }
                        }
                    }
                }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Create Category"
            }
        }
    }
}
