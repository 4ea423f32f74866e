//! Spendwise is a web app for tracking personal expenses.
//!
//! Users record what they spend in US dollars or Uzbek so'm, group expenses
//! into categories and get a summary of their spending converted into the
//! currency of their choice.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod category;
pub mod currency;
mod dashboard;
mod db;
mod endpoints;
mod expense;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod preferences;
mod routing;
pub mod stats;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    Email, PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email,
    update_password,
};
pub use category::{CategoryColor, CategoryIcon, CategoryName, create_category};
pub use db::initialize as initialize_db;
pub use expense::{NewExpense, create_expense};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

use crate::{
    alert::Alert, category::CategoryId, currency::Currency,
    internal_server_error::InternalServerError, not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token could not be read from or written to its cookie.
    #[error("invalid auth token: {0}")]
    InvalidToken(String),

    /// The auth token has expired and the user must log in again.
    #[error("the auth token has expired")]
    TokenExpired,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string used to register a user is not an email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// Another user already registered with the email address.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The icon or colour is not one of the options offered for categories.
    #[error("\"{0}\" is not an available category icon or colour")]
    InvalidCategoryStyle(String),

    /// The category ID used to create an expense did not match one of the
    /// user's categories.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// An expense amount was zero, negative, too large or not a number.
    #[error("{0} is not a valid amount, amounts must be greater than zero and at most one trillion")]
    InvalidAmount(f64),

    /// A currency code that is not one of the supported currencies.
    #[error("\"{0}\" is not a supported currency code")]
    InvalidCurrencyCode(String),

    /// There is no exchange rate for converting between the two currencies.
    #[error("cannot convert from {from} to {to}, there is no exchange rate for this pair")]
    UnsupportedConversion {
        /// The currency the amount is in.
        from: Currency,
        /// The currency the amount was to be converted to.
        to: Currency,
    },

    /// A stored expense date could not be parsed as an ISO 8601 calendar date.
    #[error("\"{0}\" is not a valid expense date")]
    InvalidExpenseDate(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while saving the user's display currency.
    #[error("failed to save the display currency")]
    PreferencesSaveError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::InvalidExpenseDate(_) | Error::InvalidCurrencyCode(_) => InternalServerError {
                description: "Could not load your expenses",
                fix: "One of your saved expenses is malformed. Check the server logs for details.",
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        let (status_code, message, details) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Timezone Settings",
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                "Invalid amount",
                format!(
                    "{amount} is not a valid amount. Enter an amount greater than zero and at \
                    most 1,000,000,000,000."
                ),
            ),
            Error::InvalidCategory(category_id) => (
                StatusCode::BAD_REQUEST,
                "Invalid category",
                format!(
                    "Could not find a category with the ID {category_id:?}. \
                    Try refreshing the page to see your current categories."
                ),
            ),
            Error::EmptyCategoryName => (
                StatusCode::BAD_REQUEST,
                "Invalid category name",
                "Category name cannot be empty.".to_owned(),
            ),
            Error::InvalidCategoryStyle(value) => (
                StatusCode::BAD_REQUEST,
                "Invalid category style",
                format!("\"{value}\" is not one of the available icons or colours."),
            ),
            Error::InvalidCurrencyCode(code) => (
                StatusCode::BAD_REQUEST,
                "Unsupported currency",
                format!("\"{code}\" is not a supported currency."),
            ),
            Error::UnsupportedConversion { from, to } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not convert currency",
                format!("There is no exchange rate for converting {from} to {to}."),
            ),
            Error::InvalidExpenseDate(raw_date) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not load expenses",
                format!(
                    "An expense has the malformed date \"{raw_date}\". \
                    The statistics could not be calculated."
                ),
            ),
            Error::DeleteMissingExpense => (
                StatusCode::NOT_FOUND,
                "Could not delete expense",
                "The expense could not be found. \
                Try refreshing the page to see if the expense has already been deleted."
                    .to_owned(),
            ),
            Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                "Could not delete category",
                "The category could not be found. \
                Try refreshing the page to see if the category has already been deleted."
                    .to_owned(),
            ),
            Error::PreferencesSaveError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Save Failed",
                "Failed to save your display currency. Please try again.".to_owned(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.".to_owned(),
            ),
        };

        Alert::Error {
            message: message.to_owned(),
            details,
        }
        .into_response_with_status(status_code)
    }
}
