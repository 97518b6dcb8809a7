//! Argon2id hashing for credentials held by the in-memory backend.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{StorageError, StorageResult};

/// Argon2id cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Time cost (iterations).
    pub time_cost: u32,
    /// Parallelism factor.
    pub parallelism: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        // OWASP recommended settings for Argon2id
        Self {
            memory_cost: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl PasswordPolicy {
    /// Creates a policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the memory cost in KiB.
    #[must_use]
    pub const fn memory_cost(mut self, kib: u32) -> Self {
        self.memory_cost = kib;
        self
    }

    /// Sets the time cost (iterations).
    #[must_use]
    pub const fn time_cost(mut self, iterations: u32) -> Self {
        self.time_cost = iterations;
        self
    }

    fn build_params(&self) -> Result<Params, argon2::Error> {
        Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
    }
}

/// Hashes and verifies secrets with Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasherService {
    policy: PasswordPolicy,
}

impl PasswordHasherService {
    /// Creates a hasher with the given policy.
    #[must_use]
    pub const fn new(policy: PasswordPolicy) -> Self {
        Self { policy }
    }

    /// Hashes a secret into a PHC string.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Credential` if the policy is invalid.
    pub fn hash(&self, secret: &str) -> StorageResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let params = self
            .policy
            .build_params()
            .map_err(|e| StorageError::credential(e.to_string()))?;

        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| StorageError::credential(e.to_string()))
    }

    /// Verifies a secret against a PHC string.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Credential` if the stored hash is malformed.
    pub fn verify(&self, secret: &str, hash: &str) -> StorageResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| StorageError::credential(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok())
    }
}
