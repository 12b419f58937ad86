//! `PostgreSQL` storage for the banquet booking backend.
//!
//! [`PostgresBanquetStore`] implements every storage trait from
//! `banquet_core::providers` on top of a shared `sqlx` pool:
//!
//! - Companies, sub-users and login lookup
//! - Per-hall slot catalogs, replaced atomically
//! - Bookings, with the (company, hall, date, slot) unique constraint as the
//!   final arbiter between concurrent requests
//! - Customer directory and event records, written in one transaction
//! - Function and meal type pick lists
//!
//! The schema is created by the versioned migrations under `migrations/`.
//!
//! # Example
//!
//! ```no_run
//! use banquet_postgres::PostgresBanquetStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresBanquetStore::connect("postgres://localhost/banquet").await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bookings;
mod catalog;
mod customers;
mod error;
mod events;
mod slots;
mod tenant;
mod transaction;

pub use transaction::with_transaction;

use banquet_core::error::{BanquetError, Result};
use sqlx::PgPool;

/// Store backed by a `PostgreSQL` connection pool.
///
/// Cloning shares the pool.
#[derive(Clone, Debug)]
pub struct PostgresBanquetStore {
    pool: PgPool,
}

impl PostgresBanquetStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`BanquetError::Database`] if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| error::database("Failed to connect", &e))?;
        Ok(Self::new(pool))
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`BanquetError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| BanquetError::Database(format!("Migration failed: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}
