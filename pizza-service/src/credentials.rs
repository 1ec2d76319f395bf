use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use anyhow::anyhow;
use rand_core::OsRng;

use crate::error::{ServiceError, ServiceResult};

pub fn hash_password(password: &str) -> ServiceResult<String> {
    if password.trim().is_empty() {
        return Err(ServiceError::MissingFields);
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ServiceError::Internal(anyhow!("failed to hash password: {err}")))
}

/// Argon2 verification; the comparison happens over the hash, never over
/// plaintext, and runs in constant time.
pub fn verify_password(stored_hash: &str, candidate: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}
