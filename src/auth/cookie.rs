//! Reading and writing the encrypted auth cookie.
//!
//! The cookie holds a JSON encoded [Token]. The cookie jar is private, so the
//! client can neither read nor forge the token.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    auth::{Token, UserID},
};

pub(crate) const COOKIE_TOKEN: &str = "token";

/// How long a session lasts without activity.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

/// Log in `user_id` by adding a token cookie that expires `duration` from now.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the token cannot be encoded.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc().to_offset(local_offset) + duration;

    set_token_cookie(
        jar,
        Token {
            user_id,
            expires_at,
        },
    )
}

fn set_token_cookie(jar: PrivateCookieJar, token: Token) -> Result<PrivateCookieJar, Error> {
    let expires_at = token.expires_at;
    let value = serde_json::to_string(&token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, value))
            .expires(expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Read the token from the auth cookie.
///
/// # Errors
///
/// Returns [Error::CookieMissing] if there is no auth cookie,
/// [Error::InvalidToken] if it cannot be decoded and [Error::TokenExpired]
/// if the token is past its expiry.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;

    let token: Token = serde_json::from_str(cookie.value_trimmed())
        .map_err(|error| Error::InvalidToken(error.to_string()))?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::TokenExpired);
    }

    Ok(token)
}

/// Push the expiry of the auth cookie out to `duration` from now, unless it
/// already expires later than that.
///
/// # Errors
///
/// Returns the same errors as [get_token_from_cookies] and
/// [set_auth_cookie]. The jar is unchanged when an error is returned.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;
    let new_expiry = OffsetDateTime::now_utc().to_offset(local_offset) + duration;

    if new_expiry <= token.expires_at {
        return Ok(jar);
    }

    set_token_cookie(
        jar,
        Token {
            user_id: token.user_id,
            expires_at: new_expiry,
        },
    )
}

/// Overwrite the auth cookie with an expired placeholder so the browser drops it.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}
