//! Authorization gate for protected requests.
//!
//! The gate accepts a raw `Authorization` header value and answers a single
//! question: may this request proceed? Missing headers, foreign schemes,
//! malformed, expired and forged tokens all produce the same
//! [`GateError::InvalidToken`].

use crate::token::{inspect_token_at, unix_now};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("invalid or missing token")]
    InvalidToken,
}

/// Extracts the token from a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix(BEARER_PREFIX)
}

/// Checks an `Authorization` header against the signing secret.
pub fn authorize(header: Option<&str>, secret: &str) -> Result<(), GateError> {
    authorize_at(header, secret, unix_now())
}

pub fn authorize_at(header: Option<&str>, secret: &str, now: u64) -> Result<(), GateError> {
    let token = header
        .and_then(bearer_token)
        .ok_or(GateError::InvalidToken)?;

    inspect_token_at(secret, token, now).map(|_| ()).map_err(|reason| {
        tracing::debug!("Rejected bearer token: {reason}");
        GateError::InvalidToken
    })
}
