//! AliasVault core library — session and settings logic for the admin proxy.
//!
//! `aliasvault-core` holds everything that has actual protocol or state
//! semantics, decoupled from the HTTP layer so the web binary stays thin.
//!
//! # Modules
//!
//! - [`token`] — Token Authority: mint and verify HMAC-SHA256 session tokens.
//! - [`rate_limit`] — Fixed-window login rate limiter keyed by client id.
//! - [`gate`] — Authorization gate for `Bearer` credentials.
//! - [`password`] — Argon2 hashing of the admin password.
//! - [`settings`] — The persisted settings blob and key-value store backends.
//! - [`error`] — Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod error;
pub mod gate;
pub mod password;
pub mod rate_limit;
pub mod settings;
pub mod token;

pub use error::{CoreError, CoreResult};
pub use gate::{authorize, authorize_at, bearer_token, GateError};
pub use rate_limit::{LoginAttempt, LoginRateLimiter};
pub use settings::{
    generate_secret, load_settings, save_settings, FileStore, KeyValueStore, MemoryStore,
    Settings, SettingsUpdate,
};
pub use token::{
    create_token, create_token_at, unix_now, verify_token, verify_token_at, TokenClaims,
    TokenError,
};
