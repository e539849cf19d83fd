//! Works out where to send a user after they log in.

use axum::{
    extract::Request,
    http::{HeaderMap, Uri},
};

use crate::endpoints;

/// Paths that make no sense to return to after logging in.
const AUTH_PAGES: [&str; 2] = [endpoints::LOG_IN_VIEW, endpoints::REGISTER_VIEW];

/// The path and query of `raw_url` if it stays on this site.
///
/// Absolute URLs, protocol-relative URLs (`//host`) and the auth pages
/// themselves are rejected.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    local_path_and_query(&uri)
}

/// Like [normalize_redirect_url] but for the `HX-Current-URL` header, which
/// htmx sends as a full URL including the host.
fn normalize_current_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    local_path_and_query(&uri)
}

fn local_path_and_query(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?;
    let path = path_and_query.path();

    if !path.starts_with('/') || path.starts_with("//") || AUTH_PAGES.contains(&path) {
        return None;
    }

    Some(path_and_query.as_str().to_owned())
}

/// The log-in page URL that returns to `target` afterwards.
pub fn log_in_url_for(target: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", target)]) {
        Ok(query) => format!("{}?{}", endpoints::LOG_IN_VIEW, query),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

/// The log-in page URL for an unauthenticated `request`.
///
/// Page requests return to the requested page. htmx requests to `/api`
/// return to the page the user was looking at. Anything else falls back to
/// the dashboard.
pub fn log_in_url_for_request(request: &Request) -> String {
    let target = if request.uri().path().starts_with("/api") {
        current_page_from_headers(request.headers())
    } else {
        request
            .uri()
            .path_and_query()
            .and_then(|path_and_query| normalize_redirect_url(path_and_query.as_str()))
    };

    let target = target.unwrap_or_else(|| {
        tracing::warn!(
            "No usable redirect target for {}, falling back to the dashboard.",
            request.uri()
        );
        endpoints::DASHBOARD_VIEW.to_owned()
    });

    log_in_url_for(&target)
}

fn current_page_from_headers(headers: &HeaderMap) -> Option<String> {
    let is_htmx = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_htmx {
        return None;
    }

    headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
        .and_then(normalize_current_url)
}
