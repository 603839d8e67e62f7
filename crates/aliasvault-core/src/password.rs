//! Argon2 hashing for the admin password.
//!
//! Both functions are CPU-heavy; async callers should run them on a
//! blocking thread.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{CoreError, CoreResult};

/// Returns `Ok(false)` on mismatch and an error only if `hash` is not a valid PHC string.
pub fn verify_password(hash: &str, password: &str) -> CoreResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| CoreError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}
