//! Password hashing using Argon2id
//!
//! Stored passwords are PHC strings (`$argon2id$v=19$m=...`). Verification reads the
//! algorithm parameters from the stored hash, so hashes created with other Argon2
//! parameters keep verifying.
//!
//! # Example
//!
//! ```rust
//! use portal_service::auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::default();
//! let hash = hasher.hash("my_secure_password").unwrap();
//!
//! assert!(hasher.verify("my_secure_password", &hash).unwrap());
//! assert!(!hasher.verify("wrong_password", &hash).unwrap());
//! ```

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2Hasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::error::{DomainError, DomainResult, ErrorCode};

/// Password hasher using Argon2id
#[derive(Clone, Default)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Hasher with custom cost parameters
    pub fn new(memory_cost_kib: u32, time_cost: u32, parallelism: u32) -> DomainResult<Self> {
        let params = Params::new(memory_cost_kib, time_cost, parallelism, None).map_err(|e| {
            DomainError::wrap(
                ErrorCode::InvalidArgument,
                format!("Invalid Argon2 parameters: {}", e),
            )
        })?;
        Ok(Self { params })
    }

    /// Hash a password into a PHC string
    pub fn hash(&self, password: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC string
    ///
    /// Returns `Ok(false)` on mismatch. A malformed stored hash is `Internal`.
    pub fn verify(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| DomainError::internal(format!("Invalid password hash format: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(DomainError::internal(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::default();
        let password = "test_password_123";

        let hash = hasher.hash(password).expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$"));

        assert!(hasher.verify(password, &hash).expect("Verification failed"));
        assert!(!hasher
            .verify("wrong_password", &hash)
            .expect("Verification failed"));
    }

    #[test]
    fn test_hash_from_other_parameters_still_verifies() {
        let cheap = PasswordHasher::new(8, 1, 1).expect("params");
        let hash = cheap.hash("secret").expect("hash");

        assert!(PasswordHasher::default()
            .verify("secret", &hash)
            .expect("verify"));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let err = PasswordHasher::new(0, 0, 0).err().expect("invalid params");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_invalid_hash_format() {
        let hasher = PasswordHasher::default();
        let err = hasher.verify("password", "not_a_valid_hash").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hasher = PasswordHasher::default();
        let password = "test_password_123";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify(password, &hash1).unwrap());
        assert!(hasher.verify(password, &hash2).unwrap());
    }
}
