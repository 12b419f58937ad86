//! Transaction scoping.

use crate::error::database;
use banquet_core::error::Result;
use futures::future::BoxFuture;
use sqlx::{PgPool, Postgres, Transaction};

/// Run `f` inside a transaction.
///
/// Commits when `f` succeeds. On failure the transaction is rolled back and
/// `f`'s error is returned unchanged. The connection goes back to the pool on
/// every path.
///
/// # Errors
///
/// Returns `f`'s error, or `BanquetError::Database` if the transaction cannot
/// be opened or committed.
///
/// # Example
///
/// ```no_run
/// use banquet_postgres::with_transaction;
///
/// # async fn example(pool: sqlx::PgPool) -> banquet_core::Result<()> {
/// let count: i64 = with_transaction(&pool, |tx| {
///     Box::pin(async move {
///         let (n,): (i64,) = sqlx::query_as("SELECT count(*) FROM banquet_bookings")
///             .fetch_one(&mut **tx)
///             .await
///             .map_err(|e| banquet_core::BanquetError::Database(e.to_string()))?;
///         Ok(n)
///     })
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_transaction<T, F>(pool: &PgPool, f: F) -> Result<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut Transaction<'static, Postgres>) -> BoxFuture<'c, Result<T>> + Send,
{
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| database("Failed to start transaction", &e))?;

    match f(&mut tx).await {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| database("Failed to commit transaction", &e))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %rollback, "Rollback failed");
            }
            Err(err)
        }
    }
}
