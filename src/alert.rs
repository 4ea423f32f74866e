//! Alert messages that are swapped into the page's alert container.
//!
//! Handlers return an [Alert] to tell the user about the outcome of an HTMX
//! request. The alert replaces the `#alert-container` element rendered by
//! [crate::html::base] via an out-of-band swap, so it shows up regardless of
//! which element the request targeted.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A success or error message shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without details.
    SuccessSimple {
        /// The headline of the alert.
        message: String,
    },
    /// An error message with extra details, e.g. how to fix the problem.
    Error {
        /// The headline of the alert.
        message: String,
        /// Text shown below the headline.
        details: String,
    },
}

impl Alert {
    /// Render the alert as an out-of-band swap for the alert container.
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::SuccessSimple { message } => (false, message, None),
            Alert::Error { message, details } => (true, message, Some(details)),
        };

        let style = if is_error {
            "flex items-start gap-3 p-4 rounded-lg border text-red-800 \
            border-red-300 bg-red-50 dark:bg-gray-800 dark:text-red-400 \
            dark:border-red-800"
        } else {
            "flex items-start gap-3 p-4 rounded-lg border text-green-800 \
            border-green-300 bg-green-50 dark:bg-gray-800 dark:text-green-400 \
            dark:border-green-800"
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div role="alert" class=(style)
                {
                    div class="flex-1"
                    {
                        p class="text-sm font-medium" { (message) }

                        @if let Some(details) = details.filter(|details| !details.is_empty()) {
                            p class="mt-1 text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        onclick="this.closest('#alert-container').classList.add('hidden')"
                        class="text-sm font-semibold"
                    {
                        "✕"
                    }
                }
            }
        }
    }

    /// Render the alert with the given status code.
    pub fn into_response_with_status(self, status_code: StatusCode) -> Response {
        (status_code, self.into_html()).into_response()
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_response_with_status(StatusCode::OK)
    }
}
