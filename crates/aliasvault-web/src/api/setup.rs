use axum::extract::State;
use axum::Json;

use aliasvault_core::password::hash_password;
use aliasvault_core::{
    create_token, generate_secret, load_settings, save_settings, Settings, SettingsUpdate,
};

use crate::auth::middleware::AdminSession;
use crate::dto::{
    ApiJson, ApiResponse, InitializationStatus, InitializeRequest, InitializeResponse,
    MessageResponse, UpdateSettingsRequest,
};
use crate::error::AppError;
use crate::state::AppState;

async fn hash_on_blocking_thread(password: String) -> Result<String, AppError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(hash)
}

pub async fn check_initialization(
    State(state): State<AppState>,
) -> Json<ApiResponse<InitializationStatus>> {
    let initialized = state.settings().await.is_some();
    Json(ApiResponse::ok(InitializationStatus { initialized }))
}

/// First-run setup: stores the admin password hash, API key and signing
/// secret, then logs the admin in.
pub async fn initialize(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<InitializeRequest>,
) -> Result<Json<ApiResponse<InitializeResponse>>, AppError> {
    let _guard = state.settings_lock.lock().await;

    if state.settings().await.is_some() {
        tracing::warn!("Rejected initialization: already initialized");
        return Err(AppError::AlreadyInitialized);
    }

    if body.admin_password.is_empty() || body.addy_api_key.is_empty() {
        return Err(AppError::MissingFields(
            "admin_password and addy_api_key are required".to_string(),
        ));
    }

    let jwt_secret = body
        .jwt_secret
        .filter(|s| !s.is_empty())
        .unwrap_or_else(generate_secret);

    let settings = Settings {
        admin_password_hash: hash_on_blocking_thread(body.admin_password).await?,
        addy_api_key: body.addy_api_key,
        jwt_secret,
        initialized: true,
    };
    save_settings(state.store.as_ref(), &settings).await?;

    let (token, _) = create_token(&settings.jwt_secret)?;
    tracing::info!("System initialized");

    Ok(Json(ApiResponse::ok(InitializeResponse {
        message: "System initialized successfully".to_string(),
        token,
    })))
}

/// Replaces any non-empty field. A new `jwt_secret` invalidates every
/// outstanding token, including the caller's.
pub async fn update_settings(
    _session: AdminSession,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateSettingsRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    let _guard = state.settings_lock.lock().await;

    // Re-read under the lock so concurrent updates don't drop each other's fields.
    let current = load_settings(state.store.as_ref())
        .await
        .filter(|s| s.initialized)
        .ok_or(AppError::NotInitialized)?;

    let admin_password_hash = match body.admin_password.filter(|p| !p.is_empty()) {
        Some(password) => Some(hash_on_blocking_thread(password).await?),
        None => None,
    };

    let rotated_secret = body.jwt_secret.as_deref().is_some_and(|s| !s.is_empty());
    let updated = current.merged(SettingsUpdate {
        admin_password_hash,
        addy_api_key: body.addy_api_key,
        jwt_secret: body.jwt_secret,
    });
    save_settings(state.store.as_ref(), &updated).await?;

    if rotated_secret {
        tracing::info!("Settings updated; signing secret rotated");
    } else {
        tracing::info!("Settings updated");
    }

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Settings updated successfully".to_string(),
    })))
}
