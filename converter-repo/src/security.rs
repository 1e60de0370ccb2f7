//! Credential hashing for the in-memory identity provider.

use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Generates a random 16-byte salt, hex encoded.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Hashes a password with its salt using SHA-256.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verifies a password against a stored hash using constant-time comparison.
pub fn verify_password(input: &str, salt: &str, stored_hash: &str) -> bool {
    let input_hash = hash_password(input, salt);
    input_hash.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("hunter2", "abc");

        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_password("hunter2", "abc"));
        assert_ne!(hash, hash_password("hunter2", "abd"));
    }

    #[test]
    fn test_password_verification() {
        let salt = generate_salt();
        let hash = hash_password("hunter2", &salt);

        assert!(verify_password("hunter2", &salt, &hash));
        assert!(!verify_password("hunter3", &salt, &hash));
        assert!(!verify_password("hunter2", "other-salt", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let salt = generate_salt();
        assert_eq!(salt.len(), 32);
        assert_ne!(salt, generate_salt());
    }
}
