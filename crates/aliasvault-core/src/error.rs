//! Error types for `aliasvault-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. Token verification is not
//! one of them: it fails closed and reports a plain `bool`.

/// Unified error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The HMAC key could not be constructed or the claims could not be encoded.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// Hashing a password failed, or a stored hash is not a valid PHC string.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// The key-value store rejected a read or write.
    #[error("settings store error: {0}")]
    Store(String),

    /// JSON (de)serialisation of the settings blob failed.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `aliasvault-core`.
pub type CoreResult<T> = Result<T, CoreError>;
