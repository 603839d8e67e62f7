use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use aliasvault_core::{authorize, Settings};

use crate::error::AppError;
use crate::state::AppState;

/// Settings of an initialized proxy. Rejects with `NOT_INITIALIZED` before setup.
pub struct Initialized(pub Settings);

impl FromRequestParts<AppState> for Initialized {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .settings()
            .await
            .map(Initialized)
            .ok_or(AppError::NotInitialized)
    }
}

/// Proof that the request carried a valid admin token.
///
/// There is a single administrator, so no identity is attached; the
/// settings are passed along because every protected handler needs them.
pub struct AdminSession {
    pub settings: Settings,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Initialized(settings) = Initialized::from_request_parts(parts, state).await?;

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        authorize(auth_header, &settings.jwt_secret).map_err(|_| {
            tracing::debug!("Rejected request to {}: invalid token", parts.uri.path());
            AppError::InvalidToken
        })?;

        Ok(AdminSession { settings })
    }
}
