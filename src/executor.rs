use std::future::Future;
use std::pin::Pin;

use tracing::error;

use crate::db::{StateDb, StateTx};
use crate::error::{ErrorCode, RpcError};

/// Runs a unit of work inside a database transaction scope.
///
/// Begins a transaction on `db`, invokes `work` exactly once with the open
/// handle, then finalizes: commit if the work succeeded, rollback if it
/// failed. Every failure surfaces as an [`RpcError`]:
///
/// - If the transaction cannot be begun, returns `"failed to connect to the
///   state"` wrapping the driver error; no finalization is attempted.
/// - If the work fails and rollback succeeds, returns the work's error
///   unchanged.
/// - If the work fails and rollback also fails, returns `"failed to rollback
///   db transaction"` wrapping the rollback error, with the work's error
///   retained in [`RpcError::superseded`].
/// - If the work succeeds but commit fails, returns `"failed to commit db
///   transaction"`; the work's result is discarded.
///
/// The scope runs in the caller's task: dropping the returned future cancels
/// it, and a deadline can be applied by wrapping the call in
/// `tokio::time::timeout`.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::MySqlPool;
/// use scoped_tx::{run_scoped, ErrorCode, RpcError};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/state").await?;
/// let inserted = run_scoped(&pool, |tx| {
///     Box::pin(async move {
///         let result = sqlx::query("INSERT INTO accounts (owner) VALUES (?)")
///             .bind("alice")
///             .execute(tx.as_executor())
///             .await
///             .map_err(|e| RpcError::with_cause(ErrorCode::DEFAULT, "insert failed", e))?;
///         Ok(result.last_insert_id())
///     })
/// })
/// .await?;
/// println!("created account {inserted}");
/// # Ok(())
/// # }
/// ```
///
/// Business errors roll the scope back and come out unchanged:
///
/// ```rust,no_run
/// use sqlx::MySqlPool;
/// use scoped_tx::{run_scoped, ErrorCode, RpcError};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/state").await?;
/// let result = run_scoped(&pool, |tx| {
///     Box::pin(async move {
///         sqlx::query("UPDATE accounts SET balance = balance - 10 WHERE owner = ?")
///             .bind("alice")
///             .execute(tx.as_executor())
///             .await
///             .map_err(|e| RpcError::with_cause(ErrorCode::DEFAULT, "debit failed", e))?;
///         Err::<(), _>(RpcError::new(ErrorCode::INVALID_REQUEST, "insufficient funds"))
///     })
/// })
/// .await;
///
/// assert!(result.is_err()); // the debit was rolled back
/// # Ok(())
/// # }
/// ```
pub async fn run_scoped<D, F, T>(db: &D, work: F) -> Result<T, RpcError>
where
    D: StateDb,
    F: for<'a> FnOnce(
        &'a mut D::Tx,
    ) -> Pin<Box<dyn Future<Output = Result<T, RpcError>> + Send + 'a>>,
    T: Send,
{
    let mut tx = match db.begin_tx().await {
        Ok(tx) => tx,
        Err(err) => {
            error!("failed to begin state transaction: {err}");
            return Err(RpcError::with_cause(
                ErrorCode::DEFAULT,
                "failed to connect to the state",
                err,
            ));
        }
    };

    match work(&mut tx).await {
        Ok(value) => match tx.commit().await {
            Ok(()) => Ok(value),
            Err(err) => {
                error!("failed to commit db transaction: {err}");
                Err(RpcError::with_cause(
                    ErrorCode::DEFAULT,
                    "failed to commit db transaction",
                    err,
                ))
            }
        },
        Err(work_err) => match tx.rollback().await {
            Ok(()) => Err(work_err),
            Err(err) => {
                error!("failed to rollback db transaction: {err}; superseded business error: {work_err}");
                Err(RpcError::with_cause(
                    ErrorCode::DEFAULT,
                    "failed to rollback db transaction",
                    err,
                )
                .superseding(work_err))
            }
        },
    }
}
