mod aliases;
mod auth_handlers;
mod setup;
#[cfg(test)]
mod tests;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::AdminSession;
use crate::error::AppError;
use crate::middleware::origin::{cors_layer, origin_guard};
use crate::middleware::security_headers::{security_headers, security_headers_with_hsts};
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Routes reachable without a token. `/health` and `/auth` still require
/// a completed setup.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/initialize/check", get(setup::check_initialization))
        .route("/initialize", post(setup::initialize))
        .route("/health", get(auth_handlers::health))
        .route("/auth", post(auth_handlers::login))
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/settings", patch(setup::update_settings))
        .route(
            "/aliases",
            get(aliases::list_aliases).post(aliases::create_alias),
        )
        .route(
            "/aliases/{id}",
            patch(aliases::update_alias).delete(aliases::delete_alias),
        )
        .route("/aliases/{id}/enable", post(aliases::enable_alias))
        .route("/aliases/{id}/disable", post(aliases::disable_alias))
        .route("/recipients", get(aliases::list_recipients))
        .route("/domains", get(aliases::list_domains))
}

/// Unknown routes sit behind the token gate too, so probing without a
/// token yields `401` rather than `404`.
async fn not_found(_session: AdminSession) -> AppError {
    AppError::NotFound
}

/// The full application: routes plus the middleware stack.
///
/// Security headers wrap everything, including origin-guard rejections and
/// CORS preflight answers.
pub fn router(state: AppState) -> Router {
    let base_router = Router::new()
        .merge(public_router())
        .merge(protected_router())
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors_layer(state.config.allowed_origin.clone()))
        .layer(from_fn_with_state(state.clone(), origin_guard));

    let base_router = if state.config.tls_enabled() {
        base_router.layer(from_fn(security_headers_with_hsts))
    } else {
        base_router.layer(from_fn(security_headers))
    };

    base_router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
