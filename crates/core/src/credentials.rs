//! Password credentials
//!
//! Passwords are never stored. Each user keeps an Argon2id hash in PHC
//! string format, and a guess matches only if Argon2 verification succeeds.
//!
//! Rejecting an unknown username costs the same Argon2 work as rejecting
//! a wrong password: the guess is checked against a placeholder hash made
//! with the same parameters.

use std::cell::Cell;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use crate::config::{ConfigError, SecurityConfig};
use crate::error::{Error, Result};

/// Hashes and verifies passwords with fixed Argon2id cost parameters
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
    /// Placeholder credential verified when no user matches
    placeholder: String,
    verifications: Cell<u64>,
}

impl CredentialHasher {
    /// Build a hasher from configured cost parameters
    pub fn from_config(security: &SecurityConfig) -> std::result::Result<Self, ConfigError> {
        let params = Params::new(
            security.memory_kib,
            security.iterations,
            security.parallelism,
            None,
        )
        .map_err(|e| ConfigError::InvalidSecurity(e.to_string()))?;

        let mut hasher = Self {
            params,
            placeholder: String::new(),
            verifications: Cell::new(0),
        };
        hasher.placeholder = hasher
            .hash("quill-placeholder")
            .map_err(|e| ConfigError::InvalidSecurity(e.to_string()))?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Derive a storable credential from a raw password
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| Error::Credential(e.to_string()))
    }

    /// Check a password guess against a stored credential
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        self.verifications.set(self.verifications.get() + 1);
        let parsed = match PasswordHash::new(stored) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(error = %e, "Stored credential is not a valid PHC string");
                return false;
            }
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend a verification on a guess for a user that does not exist
    ///
    /// Always returns false.
    pub fn verify_missing(&self, password: &str) -> bool {
        // Outcome ignored; a missing user never authenticates
        let _ = self.verify(password, &self.placeholder);
        false
    }

    /// Number of Argon2 verifications performed so far
    pub fn verifications(&self) -> u64 {
        self.verifications.get()
    }
}
