use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::auth::middleware::AdminSession;
use crate::dto::{ApiJson, ApiResponse, CreateAliasRequest};
use crate::error::AppError;
use crate::state::AppState;

type DataResponse = Json<ApiResponse<Value>>;

/// Alias ids are interpolated into upstream paths, so only plain id
/// characters are accepted.
fn validate_alias_id(id: &str) -> Result<&str, AppError> {
    let valid = !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(id)
    } else {
        Err(AppError::BadRequest(format!("Invalid alias id: {id}")))
    }
}

pub async fn list_aliases(
    session: AdminSession,
    State(state): State<AppState>,
) -> Result<DataResponse, AppError> {
    let data = state
        .upstream
        .list_aliases(&session.settings.addy_api_key)
        .await?;
    Ok(Json(ApiResponse::ok(data)))
}

pub async fn create_alias(
    session: AdminSession,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateAliasRequest>,
) -> Result<(StatusCode, DataResponse), AppError> {
    let data = state
        .upstream
        .create_alias(&session.settings.addy_api_key, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(data))))
}

pub async fn update_alias(
    session: AdminSession,
    State(state): State<AppState>,
    Path(alias_id): Path<String>,
    ApiJson(changes): ApiJson<Value>,
) -> Result<DataResponse, AppError> {
    let alias_id = validate_alias_id(&alias_id)?;
    let data = state
        .upstream
        .update_alias(&session.settings.addy_api_key, alias_id, &changes)
        .await?;
    Ok(Json(ApiResponse::ok(data)))
}

pub async fn delete_alias(
    session: AdminSession,
    State(state): State<AppState>,
    Path(alias_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let alias_id = validate_alias_id(&alias_id)?;
    state
        .upstream
        .delete_alias(&session.settings.addy_api_key, alias_id)
        .await?;
    tracing::info!("Deleted alias {alias_id}");
    Ok(Json(ApiResponse::empty()))
}

pub async fn enable_alias(
    session: AdminSession,
    State(state): State<AppState>,
    Path(alias_id): Path<String>,
) -> Result<DataResponse, AppError> {
    set_active(session, state, alias_id, true).await
}

pub async fn disable_alias(
    session: AdminSession,
    State(state): State<AppState>,
    Path(alias_id): Path<String>,
) -> Result<DataResponse, AppError> {
    set_active(session, state, alias_id, false).await
}

async fn set_active(
    session: AdminSession,
    state: AppState,
    alias_id: String,
    active: bool,
) -> Result<DataResponse, AppError> {
    let alias_id = validate_alias_id(&alias_id)?;
    let data = state
        .upstream
        .set_alias_active(&session.settings.addy_api_key, alias_id, active)
        .await?;
    Ok(Json(ApiResponse::ok(data)))
}

pub async fn list_recipients(
    session: AdminSession,
    State(state): State<AppState>,
) -> Result<DataResponse, AppError> {
    let data = state
        .upstream
        .list_recipients(&session.settings.addy_api_key)
        .await?;
    Ok(Json(ApiResponse::ok(data)))
}

pub async fn list_domains(
    session: AdminSession,
    State(state): State<AppState>,
) -> Result<DataResponse, AppError> {
    let data = state
        .upstream
        .list_domains(&session.settings.addy_api_key)
        .await?;
    Ok(Json(ApiResponse::ok(data)))
}
