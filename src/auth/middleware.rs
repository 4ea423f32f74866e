//! Middleware that only lets logged in users through.
//!
//! A valid auth cookie puts the user's [UserID](crate::auth::UserID) into the
//! request extensions and keeps the session alive for another five minutes.
//! Anything else is redirected to the log in page.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// How far each authenticated request pushes out the session expiry.
const SESSION_EXTENSION: Duration = Duration::minutes(5);

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Tashkent".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

async fn guard(
    state: AuthState,
    request: Request,
    next: Next,
    redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        tracing::warn!(
            "Could not work out where to return to after log in for {}, using the dashboard.",
            request.uri().path()
        );

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!(
            "Invalid timezone {}, redirecting to log in page.",
            state.local_timezone
        );
        return redirect(&log_in_url);
    };

    let (mut parts, body) = request.into_parts();

    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not read cookie jar: {error:?}");
            return redirect(&log_in_url);
        }
    };

    let token = match get_token_from_cookies(&jar) {
        Ok(token) => token,
        Err(error) => {
            tracing::debug!("Rejected request to {}: {error}", parts.uri.path());
            return redirect(&log_in_url);
        }
    };

    parts.extensions.insert(token.user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    let jar = extend_auth_cookie_duration_if_needed(jar.clone(), SESSION_EXTENSION, local_offset)
        .unwrap_or_else(|error| {
            tracing::error!("Could not extend session: {error}");
            jar
        });

    let (mut parts, body) = response.into_parts();
    let jar_response = jar.into_response();

    for cookie in jar_response.headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, cookie.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Guard for pages. Anonymous users get a 303 redirect to the log in page.
///
/// Handlers behind this guard can take `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, |url| Redirect::to(url).into_response()).await
}

/// Guard for HTMX endpoints. Anonymous users get an `HX-Redirect` to the log
/// in page, which HTMX follows with a full page load.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, |url| {
        (HxRedirect(url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
