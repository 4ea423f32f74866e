//! Defines the route handler for the page for recording a new expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, get_categories_by_name},
    currency::Currency,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        link, loading_spinner,
    },
    navigation::NavBar,
    preferences::get_display_currency,
    timezone::local_today,
};

/// The state needed for the new expense page.
#[derive(Debug, Clone)]
pub struct CreateExpensePageState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Tashkent".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for recording an expense.
///
/// The currency defaults to the user's display currency and the date to today.
pub async fn get_new_expense_page(
    State(state): State<CreateExpensePageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (categories, display_currency) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let categories = get_categories_by_name(user_id, &connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve categories for new expense page: {error}")
        })?;
        let display_currency = get_display_currency(user_id, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve display currency: {error}"))?;

        (categories, display_currency)
    };

    let today = local_today(&state.local_timezone)?;

    Ok(new_expense_view(today, display_currency, &categories).into_response())
}

fn new_expense_view(today: Date, default_currency: Currency, categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::EXPENSES_API)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Add Expense" }

                div class="grid grid-cols-3 gap-4"
                {
                    div class="col-span-2"
                    {
                        label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                        input
                            name="amount"
                            id="amount"
                            type="number"
                            step="0.01"
                            min="0.01"
                            placeholder="0.00"
                            required
                            autofocus
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                        select name="currency" id="currency" class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for currency in Currency::ALL {
                                option value=(currency.code()) selected[currency == default_currency]
                                {
                                    (currency.code())
                                }
                            }
                        }
                    }
                }

                div
                {
                    label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                    select name="category_id" id="category_id" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { "No category" }

                        @for category in categories {
                            option value=(category.id)
                            {
                                (category.icon.as_ref()) " " (category.name)
                            }
                        }
                    }

                    @if categories.is_empty() {
                        p class="mt-2 text-sm text-gray-500 dark:text-gray-400"
                        {
                            "You have no categories yet. "
                            (link(endpoints::NEW_CATEGORY_VIEW, "Create one"))
                        }
                    }
                }

                div
                {
                    label for="expense_date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="expense_date"
                        id="expense_date"
                        type="date"
                        required
                        value=(today)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        name="description"
                        id="description"
                        type="text"
                        placeholder="What did you spend on?"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                    " Add Expense"
                }
            }
        }
    };

    base("Add Expense", &[], &content)
}
