//! Injected dependencies: time and credential hashing.
//!
//! Operations that read the clock or touch passwords receive an
//! [`Environment`] instead of reaching for globals, so tests can pin the time
//! and swap the hasher for a fast fake.

use crate::error::{BanquetError, Result};
use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use banquet_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let _now = clock.now();
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage.
    ///
    /// # Errors
    ///
    /// Returns [`BanquetError::Internal`] if hashing fails.
    fn hash(&self, password: &str) -> Result<String>;

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`BanquetError::Internal`] if the stored hash is unreadable.
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Argon2id hasher with library defaults.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Create a hasher using the default Argon2id parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| BanquetError::Internal(format!("Failed to hash password: {e}")))?;

        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| BanquetError::Internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(BanquetError::Internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

/// Dependencies shared by every request.
#[derive(Clone)]
pub struct Environment {
    /// Source of "now" for plan expiry.
    pub clock: Arc<dyn Clock>,
    /// Credential hashing.
    pub hasher: Arc<dyn PasswordHasher>,
}

impl Environment {
    /// Bundle a clock and hasher.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { clock, hasher }
    }

    /// System clock with Argon2id hashing.
    #[must_use]
    pub fn production() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(Argon2Hasher::new()))
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("now", &self.clock.now())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn argon2_round_trip() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("s3cret").unwrap();

        assert_ne!(hash, "s3cret");
        assert!(hasher.verify("s3cret", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        let hasher = Argon2Hasher::new();
        assert!(matches!(
            hasher.verify("s3cret", "not-a-hash"),
            Err(BanquetError::Internal(_))
        ));
    }
}
