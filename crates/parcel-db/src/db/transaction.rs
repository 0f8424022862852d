//! Database transaction utilities

use sqlx::{PgPool, Postgres, Transaction};

/// A transaction that must be committed explicitly.
///
/// Dropping the guard without calling [`TransactionGuard::commit`] rolls the transaction
/// back, so an error returned halfway through a write leaves nothing behind.
///
/// ```ignore
/// let mut tx = TransactionGuard::begin(&pool).await?;
/// sqlx::query("INSERT INTO ...").execute(tx.executor()?).await?;
/// tx.commit().await?;
/// ```
pub struct TransactionGuard<'a> {
    transaction: Option<Transaction<'a, Postgres>>,
}

impl<'a> TransactionGuard<'a> {
    pub async fn begin(pool: &'a PgPool) -> Result<Self, sqlx::Error> {
        let transaction = pool.begin().await?;

        Ok(Self {
            transaction: Some(transaction),
        })
    }

    /// The open transaction, for use as a query executor.
    pub fn executor(&mut self) -> Result<&mut sqlx::PgConnection, sqlx::Error> {
        match self.transaction.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(sqlx::Error::Protocol(
                "transaction was already committed".to_string(),
            )),
        }
    }

    pub async fn commit(mut self) -> Result<(), sqlx::Error> {
        if let Some(tx) = self.transaction.take() {
            tx.commit().await?;
        }
        Ok(())
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            // sqlx queues the rollback when the inner transaction drops.
            tracing::warn!("Transaction dropped without commit, rolling back");
        }
    }
}
