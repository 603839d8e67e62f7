//! Token Authority: compact HMAC-SHA256 session tokens.
//!
//! A token is `base64(header).base64(payload).base64(signature)` where every
//! segment uses URL-safe base64 without padding and the signature is an
//! HMAC-SHA256 over the first two segments joined by `.`. Tokens are
//! self-contained: the signing secret is the only server-side state.
//!
//! Verification always uses HMAC-SHA256. The `alg` field of the header is
//! written for interoperability but never read back.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{CoreError, CoreResult};

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of a freshly minted token. Tokens are not renewable.
pub const TOKEN_TTL_SECS: u64 = 3600;

/// Value of the `iss` claim in every token.
pub const TOKEN_ISSUER: &str = "aliasvault";

#[derive(Serialize)]
struct TokenHeader {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: TokenHeader = TokenHeader {
    alg: "HS256",
    typ: "JWT",
};

/// Payload carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
}

/// Why a token was rejected.
///
/// Only used for server-side diagnostics; callers of the authorization gate
/// see a single "invalid token" outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("signature mismatch")]
    BadSignature,
}

/// Current wall-clock time in whole seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Mints a token valid for [`TOKEN_TTL_SECS`] from now.
///
/// Returns the serialized token together with its `exp` timestamp.
pub fn create_token(secret: &str) -> CoreResult<(String, u64)> {
    create_token_at(secret, unix_now())
}

/// Mints a token as if the current time were `now` (seconds since epoch).
pub fn create_token_at(secret: &str, now: u64) -> CoreResult<(String, u64)> {
    let claims = TokenClaims {
        iss: TOKEN_ISSUER.to_string(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };

    let header = encode_segment(&HEADER)?;
    let payload = encode_segment(&claims)?;
    let signing_input = format!("{header}.{payload}");

    let mut mac = new_mac(secret)?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok((format!("{signing_input}.{signature}"), claims.exp))
}

/// Returns `true` only for a well-formed, correctly signed, unexpired token.
///
/// Never panics and never returns an error: any malformed input simply
/// fails verification.
pub fn verify_token(secret: &str, token: &str) -> bool {
    verify_token_at(secret, token, unix_now())
}

/// [`verify_token`] evaluated against an explicit clock.
pub fn verify_token_at(secret: &str, token: &str, now: u64) -> bool {
    inspect_token_at(secret, token, now).is_ok()
}

/// Verifies `token` and returns its claims, or the reason it was rejected.
///
/// Checks run in a fixed order: segment count, payload decoding, expiry,
/// then signature.
pub fn inspect_token_at(secret: &str, token: &str, now: u64) -> Result<TokenClaims, TokenError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Malformed)?;
    let claims: TokenClaims =
        serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;

    if claims.exp <= now {
        return Err(TokenError::Expired);
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| TokenError::Malformed)?;

    let mut mac = new_mac(secret).map_err(|_| TokenError::BadSignature)?;
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::BadSignature)?;

    Ok(claims)
}

fn new_mac(secret: &str) -> CoreResult<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| CoreError::Signing(e.to_string()))
}

fn encode_segment<T: Serialize>(value: &T) -> CoreResult<String> {
    let json = serde_json::to_vec(value).map_err(|e| CoreError::Signing(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}
