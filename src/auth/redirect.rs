//! Where to send a user after they log in.
//!
//! Pages behind the auth guard send anonymous visitors to the log in page
//! with a `redirect_url` query parameter naming the page they asked for.
//! Only same-site paths are accepted so the parameter cannot be used as an
//! open redirect.

use axum::{
    extract::Request,
    http::{HeaderMap, Uri},
};

use crate::endpoints;

/// Whether `target` is a local path other than the auth pages.
fn is_local_page(target: &str) -> bool {
    if !target.starts_with('/') || target.starts_with("//") {
        return false;
    }

    let path = target.split('?').next().unwrap_or(target);

    path != endpoints::LOG_IN_VIEW && path != endpoints::REGISTER_VIEW
}

/// Reduce `raw_url` to its path and query, rejecting absolute URLs and
/// paths that should never be redirected to.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    local_path_and_query(&uri)
}

fn local_path_and_query(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?.as_str();

    is_local_page(path_and_query).then(|| path_and_query.to_owned())
}

/// The log in URL that returns the user to the page `request` came from.
///
/// Page requests return to the requested page. API requests made by HTMX
/// return to the page that made the request, taken from `HX-Current-URL`.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        current_page_of_hx_request(request.headers())?
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())?
    };

    build_log_in_redirect_url_from_target(&target)
}

/// The log in URL with `target` as the `redirect_url` query parameter.
pub(super) fn build_log_in_redirect_url_from_target(target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", target)])
        .inspect_err(|error| tracing::error!("Could not encode redirect URL {target}: {error}"))
        .ok()
        .map(|query| format!("{}?{query}", endpoints::LOG_IN_VIEW))
}

fn current_page_of_hx_request(headers: &HeaderMap) -> Option<String> {
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("API request is missing the HX-Request header.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("API request is missing the HX-Current-URL header.");
        return None;
    };

    // HTMX sends the full URL, so the scheme and host are dropped here.
    let redirect_url = current_url
        .parse::<Uri>()
        .ok()
        .and_then(|uri| local_path_and_query(&uri));

    if redirect_url.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}
