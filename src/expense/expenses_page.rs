//! The page listing a user's most recent expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    auth::UserID,
    currency::{Currency, format_amount},
    endpoints,
    expense::core::{ExpenseWithCategory, get_recent_expenses},
    html::{
        CARD_STYLE, LINK_STYLE, LIST_ITEM_STYLE, PAGE_CONTAINER_STYLE, base, category_icon,
        currency_badge, delete_button, link,
    },
    navigation::NavBar,
    preferences::get_display_currency,
};

/// How many expenses the expenses page shows.
const EXPENSES_PAGE_LIMIT: u32 = 20;

const DISPLAY_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[month repr:short] [day padding:none], [year]");

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the user's latest expenses.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_recent_expenses(user_id, EXPENSES_PAGE_LIMIT, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?;
    let display_currency = get_display_currency(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve display currency: {error}"))?;

    Ok(expenses_view(&expenses, display_currency).into_response())
}

fn format_display_date(date: Date) -> String {
    date.format(DISPLAY_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// A row for one expense, with a delete button that removes the row.
///
/// The amount is shown in the currency it was recorded in. Expenses recorded
/// in a currency other than `display_currency` are marked with a badge.
pub fn expense_list_item(expense: &ExpenseWithCategory, display_currency: Currency) -> Markup {
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.expense.id);
    let label = expense.label();
    let confirm_message = format!("Delete the expense '{label}'?");

    html! {
        li class=(LIST_ITEM_STYLE)
        {
            (category_icon(expense.icon(), expense.color()))

            div class="flex-1 min-w-0"
            {
                p class="font-medium truncate" { (label) }
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    time datetime=(expense.expense.date) { (format_display_date(expense.expense.date)) }
                }
            }

            div class="flex items-center gap-2 whitespace-nowrap"
            {
                span class="font-semibold" data-amount
                {
                    (format_amount(expense.expense.amount, expense.expense.currency))
                }

                @if expense.expense.currency != display_currency {
                    (currency_badge(expense.expense.currency))
                }
            }

            (delete_button(&delete_url, &confirm_message, "closest li"))
        }
    }
}

/// The list of expenses, or a prompt to add one if there are none.
pub fn expense_list(expenses: &[ExpenseWithCategory], display_currency: Currency) -> Markup {
    html! {
        @if expenses.is_empty() {
            p class="py-6 text-center text-gray-500 dark:text-gray-400"
            {
                "No expenses yet. "
                (link(endpoints::NEW_EXPENSE_VIEW, "Add your first expense!"))
            }
        } @else {
            ul class="divide-y divide-gray-200 dark:divide-gray-700"
            {
                @for expense in expenses {
                    (expense_list_item(expense, display_currency))
                }
            }
        }
    }
}

fn expenses_view(expenses: &[ExpenseWithCategory], display_currency: Currency) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Recent Expenses" }

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Add Expense" }
                }

                div id="expenses" class=(CARD_STYLE)
                {
                    (expense_list(expenses, display_currency))
                }
            }
        }
    };

    base("Expenses", &[], &content)
}
