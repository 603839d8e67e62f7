use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use aliasvault_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    RateLimited,
    InvalidCredentials,
    InvalidToken,
    NotInitialized,
    AlreadyInitialized,
    MissingFields(String),
    BadRequest(String),
    NotFound,
    /// The upstream API answered with an error. `status` is what we relay.
    Upstream {
        status: StatusCode,
        message: String,
        details: String,
    },
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
            AppError::AlreadyInitialized
            | AppError::MissingFields(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Upstream { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::RateLimited => "RATE_LIMITED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::NotInitialized => "NOT_INITIALIZED",
            AppError::AlreadyInitialized => "ALREADY_INITIALIZED",
            AppError::MissingFields(_) => "MISSING_FIELDS",
            AppError::BadRequest(_) => "INVALID_REQUEST",
            AppError::NotFound => "NOT_FOUND",
            AppError::Upstream { .. } => "ADDY_API_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            AppError::RateLimited => (
                "Too many failed attempts. Please try again later.".to_string(),
                None,
            ),
            AppError::InvalidCredentials => ("Invalid password".to_string(), None),
            AppError::InvalidToken => ("Invalid or missing token".to_string(), None),
            AppError::NotInitialized => (
                "System not initialized. Please complete setup first.".to_string(),
                None,
            ),
            AppError::AlreadyInitialized => ("System already initialized".to_string(), None),
            AppError::MissingFields(msg) | AppError::BadRequest(msg) => (msg, None),
            AppError::NotFound => ("Endpoint not found".to_string(), None),
            AppError::Upstream {
                message, details, ..
            } => (message, Some(details)),
            AppError::Internal(msg) => {
                // Log the real error server-side, return generic message to client
                tracing::error!("Internal error: {}", msg);
                ("An unexpected error occurred".to_string(), None)
            }
        };

        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(format!("{e:#}"))
    }
}
