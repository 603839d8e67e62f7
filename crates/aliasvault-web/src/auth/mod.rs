pub mod middleware;

use axum::http::HeaderMap;

/// Client identifier used for login rate limiting.
///
/// Taken from the configured connecting-IP header set by the edge proxy;
/// requests without it all share the `"unknown"` bucket.
pub fn client_id(headers: &HeaderMap, header_name: &str) -> String {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
