//! Offline password hashing (`-hash`).

use bcrypt::{BcryptError, Version};
use thiserror::Error;

/// bcrypt work factor used for every generated hash.
pub const PASSWORD_HASH_COST: u32 = 11;


#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password")]
    Hashing(#[source] BcryptError),

    #[error("failed to verify password against stored hash")]
    Verification(#[source] BcryptError),
}


/// Hashes `plaintext` with bcrypt at [`PASSWORD_HASH_COST`], in `$2a$` form.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    bcrypt::hash_with_result(plaintext, PASSWORD_HASH_COST)
        .map(|parts| parts.format_for_version(Version::TwoA))
        .map_err(PasswordError::Hashing)
}

pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(plaintext, hash).map_err(PasswordError::Verification)
}
