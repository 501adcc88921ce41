use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::{AccountError, Result};

/// One-way transform of a plaintext password into an argon2id PHC string.
/// Every call draws a new salt, so equal passwords give different hashes.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AccountError::PasswordHash(e.to_string())
        })
}

/// `Ok(false)` on mismatch; `Err` only when `stored` is not a PHC string.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| AccountError::PasswordHash(format!("unreadable stored hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("testpass123").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("testpass123", &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("adminpass").expect("hashing should succeed");
        assert!(!verify_password("adminpass ", &hash).expect("verify should not error"));
    }

    #[test]
    fn empty_password_is_hashed_too() {
        let hash = hash_password("").expect("hashing should succeed");
        assert_ne!(hash, "");
        assert!(verify_password("", &hash).unwrap());
        assert!(!verify_password("x", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        let a = hash_password("pass").unwrap();
        let b = hash_password("pass").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unreadable_hash_is_an_error() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, AccountError::PasswordHash(_)));
    }
}
