use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use aliasvault_core::password::verify_password;
use aliasvault_core::create_token;

use crate::auth::client_id;
use crate::auth::middleware::Initialized;
use crate::dto::{ApiJson, AuthRequest, AuthResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Exchanges the admin password for a session token.
///
/// The attempt reserves a rate-limit slot before the password is checked;
/// only failures are counted, and the slot is released on any other outcome.
pub async fn login(
    State(state): State<AppState>,
    Initialized(settings): Initialized,
    headers: HeaderMap,
    ApiJson(body): ApiJson<AuthRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let client = client_id(&headers, &state.config.client_ip_header);

    let Some(attempt) = state.rate_limiter.begin_attempt(&client) else {
        tracing::warn!("Login attempt rate limited for client {client}");
        return Err(AppError::RateLimited);
    };

    let hash = settings.admin_password_hash.clone();
    let password = body.password;

    let valid = tokio::task::spawn_blocking(move || verify_password(&hash, &password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    if !valid {
        attempt.fail();
        tracing::warn!("Failed login attempt from client {client}");
        return Err(AppError::InvalidCredentials);
    }
    drop(attempt);

    let (token, expires_at) = create_token(&settings.jwt_secret)?;
    tracing::info!("Admin login succeeded for client {client} (token expires at {expires_at})");

    Ok(Json(AuthResponse {
        success: true,
        token,
    }))
}

pub async fn health(Initialized(_settings): Initialized) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "initialized": true,
    }))
}
