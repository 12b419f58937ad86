//! # Banquet Testing
//!
//! Testing utilities for the banquet booking crates.
//!
//! This crate provides:
//! - [`FixedClock`] and [`test_clock`] for deterministic plan expiry
//! - [`MockPasswordHasher`], a reversible stand-in for Argon2
//! - [`InMemoryBanquetStore`], implementing every storage trait with the same
//!   semantics as the Postgres store
//! - [`fixtures`] for seeding a company with halls and members
//!
//! ## Example
//!
//! ```
//! use banquet_testing::{InMemoryBanquetStore, fixtures, test_environment};
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryBanquetStore::new();
//! let env = test_environment();
//! let company = fixtures::seed_company(&store, &env).await;
//! assert_eq!(company.company_code, "OR/1");
//! # });
//! ```

use banquet_core::environment::{Clock, Environment, PasswordHasher};
use banquet_core::error::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub mod fixtures;
pub mod store;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, PasswordHasher, Result, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use banquet_testing::mocks::FixedClock;
    /// use banquet_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Password "hashing" by prefixing, so tests skip Argon2's cost.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct MockPasswordHasher;

    impl MockPasswordHasher {
        const PREFIX: &'static str = "mock$";
    }

    impl PasswordHasher for MockPasswordHasher {
        fn hash(&self, password: &str) -> Result<String> {
            Ok(format!("{}{password}", Self::PREFIX))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool> {
            Ok(hash.strip_prefix(Self::PREFIX) == Some(password))
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, MockPasswordHasher, test_clock};
pub use store::InMemoryBanquetStore;

/// [`Environment`] pinned to [`test_clock`] with [`MockPasswordHasher`].
#[must_use]
pub fn test_environment() -> Environment {
    environment_at(test_clock().now())
}

/// [`Environment`] pinned to `now` with [`MockPasswordHasher`].
#[must_use]
pub fn environment_at(now: DateTime<Utc>) -> Environment {
    Environment::new(Arc::new(FixedClock::new(now)), Arc::new(MockPasswordHasher))
}

/// Route `tracing` output to the test harness; safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
