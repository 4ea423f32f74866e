//! Defines the endpoint for recording a new expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of rejecting the request like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::{HX_TRIGGER, HxRedirect};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    category::CategoryId,
    currency::Currency,
    endpoints,
    expense::core::{EXPENSES_CHANGED_EVENT, NewExpense, create_expense},
};

/// The state needed to create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for recording an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseForm {
    /// How much was spent, in `currency`.
    pub amount: f64,
    pub currency: Currency,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// The day the money was spent. May be in the future.
    pub expense_date: Date,
    #[serde(default)]
    pub description: String,
}

/// A route handler for recording an expense, redirects to the dashboard on success.
///
/// The response also triggers [EXPENSES_CHANGED_EVENT] so that any open
/// summary reloads itself.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let new_expense = NewExpense::build(form.amount, form.currency, form.expense_date)
        .description(&form.description)
        .category_id(form.category_id);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_expense(new_expense, user_id, &connection) {
        tracing::error!("could not create expense: {error}");

        return error.into_alert_response();
    }

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        [(HX_TRIGGER, EXPENSES_CHANGED_EVENT)],
    )
        .into_response()
}
