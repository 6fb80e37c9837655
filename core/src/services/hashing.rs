//! Secret hashing
//!
//! OTP codes get a fast SHA-256 digest (short-lived, attempt-limited). Passwords
//! and refresh token secrets get bcrypt.

use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};

use crate::errors::DomainError;

/// Hex SHA-256 digest of an OTP code
pub fn hash_otp(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a submitted code with a stored digest in constant time
pub fn otp_matches(code: &str, stored_hash: &str) -> bool {
    constant_time_eq(hash_otp(code).as_bytes(), stored_hash.as_bytes())
}

/// bcrypt hash of a password or refresh secret
pub fn hash_secret(secret: &str, cost: u32) -> Result<String, DomainError> {
    bcrypt::hash(secret, cost).map_err(DomainError::internal)
}

/// bcrypt verification; malformed hashes count as a mismatch
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    bcrypt::verify(secret, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_digest_is_stable_and_not_plaintext() {
        let digest = hash_otp("012345");
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, "012345");
        assert!(otp_matches("012345", &digest));
        assert!(!otp_matches("12345", &digest));
    }

    #[test]
    fn test_bcrypt_round_trip() {
        let hash = hash_secret("correct horse", 4).unwrap();
        assert!(verify_secret("correct horse", &hash));
        assert!(!verify_secret("wrong horse", &hash));
        assert!(!verify_secret("correct horse", "not-a-bcrypt-hash"));
    }
}
