use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::state::AppState;

/// Host part of an origin such as `https://admin.example.com:8443`.
fn origin_host(origin: &str) -> Option<&str> {
    let (_, rest) = origin.split_once("://")?;
    let host = match rest.strip_prefix('[') {
        // IPv6 literal
        Some(v6) => v6.split(']').next()?,
        None => rest.split(':').next()?,
    };
    Some(host).filter(|h| !h.is_empty())
}

/// The configured dashboard origin, any GitHub Pages site, or a local dev server.
pub fn origin_allowed(origin: &str, allowed_origin: &str) -> bool {
    if origin == allowed_origin {
        return true;
    }
    match origin_host(origin) {
        Some(host) => {
            host.ends_with(".github.io")
                || host == "localhost"
                || host.ends_with(".localhost")
                || host == "127.0.0.1"
                || host == "::1"
        }
        None => false,
    }
}

/// Rejects requests that lack an `Origin` header or come from an origin
/// the dashboard is not served from.
pub async fn origin_guard(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let allowed = match req.headers().get(ORIGIN) {
        None => {
            tracing::warn!("Blocked request without Origin: {} {}", req.method(), req.uri().path());
            return (StatusCode::FORBIDDEN, "CORS: No origin header").into_response();
        }
        Some(value) => value
            .to_str()
            .is_ok_and(|o| origin_allowed(o, &state.config.allowed_origin)),
    };

    if !allowed {
        tracing::warn!(
            "Blocked request from disallowed origin: {:?}",
            req.headers().get(ORIGIN)
        );
        return (StatusCode::FORBIDDEN, "CORS: Origin not allowed").into_response();
    }

    next.run(req).await
}

pub fn cors_layer(allowed_origin: String) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .is_ok_and(|o| origin_allowed(o, &allowed_origin))
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(86400))
}
