use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// `axum::Json` whose rejection renders as the API error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    /// Missing counts as a wrong password.
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
}

/// Uniform success envelope: `{ "success": true, "data": … }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InitializeRequest {
    #[serde(default)]
    pub admin_password: String,
    #[serde(default)]
    pub addy_api_key: String,
    #[serde(default)]
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct InitializationStatus {
    pub initialized: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    pub admin_password: Option<String>,
    pub addy_api_key: Option<String>,
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateAliasRequest {
    pub local_part: Option<String>,
    pub domain: Option<String>,
    pub description: Option<String>,
    pub recipient_ids: Option<Vec<String>>,
}

impl CreateAliasRequest {
    /// Builds the upstream body, leaving out blank and empty fields.
    pub fn to_upstream_payload(&self) -> Value {
        let mut payload = Map::new();

        if let Some(local_part) = self.local_part.as_ref().filter(|s| !s.trim().is_empty()) {
            payload.insert("local_part".into(), Value::String(local_part.clone()));
        }
        if let Some(domain) = self.domain.as_ref().filter(|s| !s.is_empty()) {
            payload.insert("domain".into(), Value::String(domain.clone()));
        }
        if let Some(description) = self.description.as_ref().filter(|s| !s.is_empty()) {
            payload.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(ids) = self.recipient_ids.as_ref().filter(|ids| !ids.is_empty()) {
            payload.insert(
                "recipient_ids".into(),
                Value::Array(ids.iter().cloned().map(Value::String).collect()),
            );
        }

        Value::Object(payload)
    }
}
