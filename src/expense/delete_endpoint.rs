//! Defines the endpoint for deleting an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HX_TRIGGER;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    expense::core::{EXPENSES_CHANGED_EVENT, ExpenseId, delete_expense},
};

/// The state needed for deleting an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting one of the user's expenses.
///
/// On success, responds with an alert and triggers [EXPENSES_CHANGED_EVENT].
pub async fn delete_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<DeleteExpenseState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_expense(expense_id, user_id, &connection) {
        Ok(()) => (
            [(HX_TRIGGER, EXPENSES_CHANGED_EVENT)],
            Alert::SuccessSimple {
                message: "Expense deleted successfully".to_owned(),
            },
        )
            .into_response(),
        Err(Error::DeleteMissingExpense) => Error::DeleteMissingExpense.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
