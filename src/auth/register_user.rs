//! The registration page and the endpoint that creates accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{Email, create_user, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base,
        email_input, loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
    timezone::get_local_offset,
};

/// The minimum password length checked by the browser. The server checks
/// password strength on top of this.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

const DUPLICATE_EMAIL_ERROR_MSG: &str = "This email is already registered";
const PASSWORD_MISMATCH_ERROR_MSG: &str = "Passwords do not match";

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm-password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

/// Error messages shown under each field of the registration form.
#[derive(Default)]
struct FormErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(email: &str, errors: FormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, errors.email))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Log in here" }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form("", FormErrors::default());
    let content = log_in_register("Create your account", &form);

    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Tashkent".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create an account and log the new user in.
///
/// Validation problems are shown next to the offending field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let email = match Email::new(&form.email) {
        Ok(email) => email,
        Err(error) => {
            let message = error.to_string();
            return registration_form(
                &form.email,
                FormErrors {
                    email: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let password = match ValidatedPassword::new(&form.password, &[email.as_ref()]) {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            return registration_form(
                &form.email,
                FormErrors {
                    password: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    if form.password != form.confirm_password {
        return registration_form(
            &form.email,
            FormErrors {
                confirm_password: Some(PASSWORD_MISMATCH_ERROR_MSG),
                ..Default::default()
            },
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        create_user(email, password_hash, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            return registration_form(
                &form.email,
                FormErrors {
                    email: Some(DUPLICATE_EMAIL_ERROR_MSG),
                    ..Default::default()
                },
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Could not create user: {error}");
            return get_internal_server_error_redirect();
        }
    };

    tracing::info!("Registered user {} ({})", user.id, user.email);

    match set_auth_cookie(jar, user.id, state.cookie_duration, local_offset) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not set auth cookie: {error}");
            get_internal_server_error_redirect()
        }
    }
}


#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode, response::Response};
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use rusqlite::Connection;
    use sha2::Digest;

    use crate::{
        PasswordHash,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, Email, create_user, get_user_by_email},
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, must_get_form, parse_html_fragment,
        },
    };

    use super::{
        DUPLICATE_EMAIL_ERROR_MSG, PASSWORD_MISMATCH_ERROR_MSG, RegisterForm, RegistrationState,
        register_user,
    };

    const STRONG_PASSWORD: &str = "asomewhatlongpassword1";

    fn get_state() -> RegistrationState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        RegistrationState {
            cookie_key: Key::from(&sha2::Sha512::digest("foobar")),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn form(email: &str, password: &str, confirm_password: &str) -> RegisterForm {
        RegisterForm {
            email: email.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        }
    }

    async fn register(state: RegistrationState, form: RegisterForm) -> Response {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        register_user(State(state), jar, Form(form)).await
    }

    #[tokio::test]
    async fn register_user_succeeds() {
        let state = get_state();

        let response = register(
            state.clone(),
            form("New.User@Example.com", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        assert!(
            response
                .headers()
                .get_all("set-cookie")
                .iter()
                .any(|cookie| cookie.to_str().unwrap().starts_with(COOKIE_TOKEN))
        );

        let connection = state.db_connection.lock().unwrap();
        let user =
            get_user_by_email(&Email::new("new.user@example.com").unwrap(), &connection).unwrap();
        assert!(user.password_hash.verify(STRONG_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn register_user_fails_with_invalid_email() {
        let response = register(
            get_state(),
            form("not-an-email", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "not-an-email is not a valid email address");
    }

    #[tokio::test]
    async fn register_user_fails_with_weak_password() {
        let response = register(get_state(), form("a@b.com", "hunter2", "hunter2")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        let error = form
            .select(&scraper::Selector::parse("p.text-red-500").unwrap())
            .next()
            .expect("No error message found")
            .text()
            .collect::<String>();
        assert!(error.starts_with("password is too weak"), "got {error}");
    }

    #[tokio::test]
    async fn register_user_fails_with_mismatched_passwords() {
        let response = register(
            get_state(),
            form("a@b.com", STRONG_PASSWORD, "asomewhatlongpassword2"),
        )
        .await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, PASSWORD_MISMATCH_ERROR_MSG);
    }

    #[tokio::test]
    async fn register_user_fails_with_duplicate_email() {
        let state = get_state();
        create_user(
            Email::new("taken@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = register(
            state,
            form("taken@example.com", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, DUPLICATE_EMAIL_ERROR_MSG);
    }
}
