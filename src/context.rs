use async_trait::async_trait;
use sqlx::{MySql, MySqlConnection, MySqlPool, Transaction};
use std::ops::DerefMut;

use crate::db::{StateDb, StateTx};

/// An open state transaction backed by SQLx.
///
/// Statement execution and querying go through [`as_executor`]; the
/// commit/rollback lifecycle goes through the [`StateTx`] trait, whose
/// finalizers consume the handle. A handle dropped without being finalized
/// rolls back (SQLx behavior).
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::MySqlPool;
/// use scoped_tx::{StateTransaction, StateTx};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/state").await?;
/// let mut tx = StateTransaction::begin(&pool).await?;
///
/// sqlx::query("INSERT INTO accounts (owner) VALUES (?)")
///     .bind("alice")
///     .execute(tx.as_executor())
///     .await?;
///
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```
///
/// [`as_executor`]: StateTransaction::as_executor
pub struct StateTransaction {
    tx: Option<Transaction<'static, MySql>>,
}

impl StateTransaction {
    /// Begins a new transaction from the connection pool.
    ///
    /// # Errors
    ///
    /// Returns the driver error if a connection cannot be acquired or the
    /// transaction cannot be started.
    pub async fn begin(pool: &MySqlPool) -> Result<Self, sqlx::Error> {
        Ok(StateTransaction {
            tx: Some(pool.begin().await?),
        })
    }

    /// Returns the underlying connection for use as a SQLx `Executor`.
    ///
    /// # Panics
    ///
    /// Panics if the transaction has already been finalized.
    pub fn as_executor(&mut self) -> &mut MySqlConnection {
        self.tx
            .as_mut()
            .expect("transaction has already been finalized")
            .deref_mut()
    }

    /// Consumes the handle and returns the raw SQLx `Transaction`.
    ///
    /// # Panics
    ///
    /// Panics if the transaction has already been finalized.
    pub fn into_inner(mut self) -> Transaction<'static, MySql> {
        self.tx
            .take()
            .expect("transaction has already been finalized")
    }
}

#[async_trait]
impl StateTx for StateTransaction {
    async fn commit(mut self) -> Result<(), sqlx::Error> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), sqlx::Error> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StateDb for MySqlPool {
    type Tx = StateTransaction;

    async fn begin_tx(&self) -> Result<StateTransaction, sqlx::Error> {
        StateTransaction::begin(self).await
    }
}

impl Drop for StateTransaction {
    fn drop(&mut self) {
        // If tx is still Some, no finalizer ran. SQLx rolls the inner
        // transaction back on drop, so nothing to do here.
    }
}
