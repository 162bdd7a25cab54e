//! Pluggable credential hashing.
//!
//! Accounts never store or compare passwords directly. A [`CredentialHasher`]
//! turns a password into a salted digest at registration and checks a login
//! attempt against that digest.

use crate::error::{Result, StoreError};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    /// Returns `Ok(false)` on a mismatch; errors are reserved for unreadable digests.
    fn verify(&self, password: &str, digest: &str) -> Result<bool>;
}

/// Argon2id work factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory in KiB.
    pub memory_kib: u32,
    pub iterations: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
        }
    }
}

pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new(cost: HashCost) -> Result<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| StoreError::ValidationError(format!("Invalid Argon2 cost: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| StoreError::internal(format!("Password hashing failed: {e}")))
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| StoreError::internal(format!("Stored digest is unreadable: {e}")))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(StoreError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Hasher {
        Argon2Hasher::new(HashCost {
            memory_kib: 8,
            iterations: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_is_salted_digest() {
        let hasher = cheap();
        let first = hasher.hash("hunter2").unwrap();
        let second = hasher.hash("hunter2").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert!(!first.contains("hunter2"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify() {
        let hasher = cheap();
        let digest = hasher.hash("hunter2").unwrap();

        assert!(hasher.verify("hunter2", &digest).unwrap());
        assert!(!hasher.verify("hunter3", &digest).unwrap());
    }

    #[test]
    fn test_verify_rejects_plaintext_digest() {
        let hasher = cheap();
        assert!(hasher.verify("admin", "admin").is_err());
    }

    #[test]
    fn test_invalid_cost() {
        let result = Argon2Hasher::new(HashCost {
            memory_kib: 1,
            iterations: 0,
        });
        assert!(matches!(result, Err(StoreError::ValidationError(_))));
    }
}
