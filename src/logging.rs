//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{Method, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

/// Bodies longer than this many bytes are truncated in `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const SECRET_FORM_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level. Bodies
/// longer than [LOG_BODY_LENGTH_LIMIT] are truncated there and logged in
/// full at the `debug` level. Password fields in submitted forms are always
/// redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = body_to_text(body).await;

    let is_form = parts.method == Method::POST
        && parts
            .headers
            .get(CONTENT_TYPE)
            .is_some_and(|value| value == "application/x-www-form-urlencoded");

    if is_form {
        let redacted = SECRET_FORM_FIELDS
            .iter()
            .fold(body_text.clone(), |text, field| redact_field(&text, field));
        log_body("Received request", &parts, &redacted);
    } else {
        log_body("Received request", &parts, &body_text);
    }

    let response = next
        .run(Request::from_parts(parts, body_text.into()))
        .await;

    let (parts, body) = response.into_parts();
    let body_text = body_to_text(body).await;
    log_body("Sending response", &parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

/// Replace the value of the form field `field_name` with asterisks.
fn redact_field(form_text: &str, field_name: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key == field_name => format!("{key}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

async fn body_to_text(body: Body) -> String {
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(error) => {
            tracing::error!("Could not read body for logging: {error}");
            String::new()
        }
    }
}

/// The longest prefix of `text` that fits in [LOG_BODY_LENGTH_LIMIT] bytes
/// without splitting a character.
fn truncate(text: &str) -> &str {
    let end = text
        .char_indices()
        .map(|(index, c)| index + c.len_utf8())
        .take_while(|end| *end <= LOG_BODY_LENGTH_LIMIT)
        .last()
        .unwrap_or(0);

    &text[..end]
}

fn log_body(prefix: &str, parts: &impl std::fmt::Debug, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{prefix}: {parts:#?}\nbody: {}...", truncate(body));
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{prefix}: {parts:#?}\nbody: {body:?}");
    }
}
