use std::future::Future;
use std::pin::Pin;

use tracing::error;

use crate::db::{StateDb, StateTx};
use crate::error::{ErrorCode, RpcError};

/// Runs a unit of work inside a transaction scope, using `anyhow::Error` for
/// the work's failures.
///
/// Convenience variant of [`run_scoped`](crate::run_scoped) for callers whose
/// business logic already speaks `anyhow::Result`. The scope semantics are
/// identical: commit on success, rollback on failure, lifecycle failures
/// wrapped as [`RpcError`] (and carried inside the returned `anyhow::Error`,
/// so they can be recovered with `downcast_ref::<RpcError>()`).
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::MySqlPool;
/// use scoped_tx::run_scoped_anyhow;
///
/// # async fn example() -> anyhow::Result<()> {
/// # let pool = MySqlPool::connect("mysql://localhost/state").await?;
/// run_scoped_anyhow(&pool, |tx| {
///     Box::pin(async move {
///         sqlx::query("INSERT INTO accounts (owner) VALUES (?)")
///             .bind("alice")
///             .execute(tx.as_executor())
///             .await?;
///         Ok(())
///     })
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_scoped_anyhow<D, F, T>(db: &D, work: F) -> anyhow::Result<T>
where
    D: StateDb,
    F: for<'a> FnOnce(
        &'a mut D::Tx,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>,
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
            )
            .into());
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
                )
                .into())
            }
        },
        Err(work_err) => match tx.rollback().await {
            Ok(()) => Err(work_err),
            Err(err) => {
                error!(
                    "failed to rollback db transaction: {err}; superseded business error: {work_err:#}"
                );
                let superseded =
                    RpcError::with_cause(ErrorCode::DEFAULT, "unit of work failed", work_err);
                Err(RpcError::with_cause(
                    ErrorCode::DEFAULT,
                    "failed to rollback db transaction",
                    err,
                )
                .superseding(superseded)
                .into())
            }
        },
    }
}
