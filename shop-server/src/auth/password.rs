//! Password hashing
//!
//! Shop owner and customer passwords persist only as bcrypt hashes. Payloads
//! may carry an already-hashed value (data import, shop migration); those are
//! stored verbatim instead of being hashed twice.

use bcrypt::{DEFAULT_COST, hash, verify};
use shared::error::AppError;

/// Recognize a bcrypt-family hash by its prefix.
pub fn is_bcrypt_hash(value: &str) -> bool {
    value.starts_with("$2a$") || value.starts_with("$2b$") || value.starts_with("$2y$")
}

/// Hash a plaintext password.
pub fn hash_password(plain: &str) -> Result<String, AppError> {
    hash(plain, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

/// Hash unless the value already is a bcrypt hash.
pub fn hash_if_needed(value: &str) -> Result<String, AppError> {
    if is_bcrypt_hash(value) {
        Ok(value.to_string())
    } else {
        hash_password(value)
    }
}

/// Check a plaintext candidate against a stored hash.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    verify(plain, hashed).unwrap_or(false)
}

/// Compare two credentials without short-circuiting on the first
/// mismatching byte. Only the length can influence timing.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_bcrypt_prefixes() {
        assert!(is_bcrypt_hash("$2a$10$abcdefghijklmnopqrstuv"));
        assert!(is_bcrypt_hash("$2b$12$abcdefghijklmnopqrstuv"));
        assert!(is_bcrypt_hash("$2y$10$abcdefghijklmnopqrstuv"));
        assert!(!is_bcrypt_hash("hunter2"));
        assert!(!is_bcrypt_hash("$1$legacy"));
        assert!(!is_bcrypt_hash(""));
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let hashed = bcrypt::hash("hunter2", 4).unwrap();
        assert!(is_bcrypt_hash(&hashed));
        assert!(verify_password("hunter2", &hashed));
        assert!(!verify_password("wrong", &hashed));
    }

    #[test]
    fn hash_if_needed_keeps_existing_hash() {
        let hashed = bcrypt::hash("hunter2", 4).unwrap();
        let result = hash_if_needed(&hashed).unwrap();
        assert_eq!(result, hashed);
    }

    #[test]
    fn hash_if_needed_hashes_plaintext() {
        let result = hash_if_needed("hunter2").unwrap();
        assert_ne!(result, "hunter2");
        assert!(is_bcrypt_hash(&result));
        assert!(verify_password("hunter2", &result));
    }

    #[test]
    fn verify_tolerates_malformed_hash() {
        assert!(!verify_password("hunter2", "not-a-hash"));
    }

    #[test]
    fn constant_time_compare() {
        assert!(constant_time_eq("hunter2", "hunter2"));
        assert!(!constant_time_eq("hunter2", "hunter3"));
        assert!(!constant_time_eq("hunter2", "hunter"));
        assert!(constant_time_eq("", ""));
    }
}
