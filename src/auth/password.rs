use crate::error::AppError;
use bcrypt::{hash, verify};

const HASH_COST: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(hash(password, HASH_COST)?)
}

/// Checks `password` against a stored bcrypt hash.
///
/// A malformed stored hash is a server-side problem, not a wrong password.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}
