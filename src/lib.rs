//! # scoped-tx
//!
//! Scoped database transaction execution with automatic commit/rollback and
//! uniform RPC-style errors.
//!
//! ## Features
//!
//! - **Atomic scopes**: one call wraps a unit of work in a transaction that
//!   is committed on success and rolled back on failure
//! - **Uniform errors**: business and transaction lifecycle failures share
//!   one structured shape ([`RpcError`]: code, message, wrapped cause), ready
//!   for an RPC-layer formatter
//! - **No lost errors**: when a rollback fails after the work already failed,
//!   the work's error is retained on the returned error instead of being
//!   silently dropped
//! - **Testable seam**: the executor is generic over the [`StateDb`] /
//!   [`StateTx`] traits; SQLx (MySQL) backs them in production
//! - **Compile-time finalization safety**: commit and rollback consume the
//!   handle, so a transaction can never be finalized twice
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["mysql", "runtime-tokio"] }
//! scoped-tx = "0.1"
//! ```
//!
//! Then wrap your business logic in a scope:
//!
//! ```rust,no_run
//! use sqlx::MySqlPool;
//! use scoped_tx::{run_scoped, ErrorCode, RpcError};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = MySqlPool::connect("mysql://localhost/state").await?;
//!
//! let account_id = run_scoped(&pool, |tx| {
//!     Box::pin(async move {
//!         let result = sqlx::query("INSERT INTO accounts (owner) VALUES (?)")
//!             .bind("alice")
//!             .execute(tx.as_executor())
//!             .await
//!             .map_err(|e| RpcError::with_cause(ErrorCode::DEFAULT, "insert failed", e))?;
//!         Ok(result.last_insert_id())
//!     })
//! })
//! .await?;
//!
//! println!("created account {account_id}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Returning an error from the unit of work rolls the scope back and hands
//! that exact error to the caller. Lifecycle failures (begin, commit,
//! rollback) are wrapped with [`ErrorCode::DEFAULT`] and a fixed message, so
//! a raw driver error never escapes:
//!
//! ```rust,no_run
//! use sqlx::MySqlPool;
//! use scoped_tx::{run_scoped, ErrorCode, RpcError};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool = MySqlPool::connect("mysql://localhost/state").await?;
//! let result = run_scoped(&pool, |tx| {
//!     Box::pin(async move {
//!         sqlx::query("UPDATE accounts SET balance = balance - 10 WHERE owner = ?")
//!             .bind("alice")
//!             .execute(tx.as_executor())
//!             .await
//!             .map_err(|e| RpcError::with_cause(ErrorCode::DEFAULT, "debit failed", e))?;
//!         Err::<(), _>(RpcError::new(ErrorCode::INVALID_REQUEST, "insufficient funds"))
//!     })
//! })
//! .await;
//!
//! if let Err(err) = result {
//!     eprintln!("request failed with code {}: {}", err.code(), err.message());
//!     if let Some(superseded) = err.superseded() {
//!         eprintln!("superseded business error: {superseded}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## How It Works
//!
//! 1. [`run_scoped`] begins a transaction through the [`StateDb`] seam
//! 2. The unit of work runs exactly once with the open handle and may
//!    execute statements and queries against it
//! 3. The executor finalizes: commit on `Ok`, rollback on `Err`, exactly
//!    one finalization per begun transaction
//! 4. Lifecycle failures come back as [`RpcError`] with a generic code and a
//!    fixed message, wrapping the driver error
//!
//! The scope runs in the caller's task, so cancellation and deadlines
//! propagate from the caller; no detached context is created.
//!
//! ## Limitations
//!
//! - Currently only supports MySQL through the bundled SQLx seam
//!   (implementing [`StateDb`] for another backend is a few lines)
//! - No savepoints: scopes do not nest
//! - Connection pooling, retries and isolation levels are the database
//!   client's responsibility
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at
//! your option.

pub mod context;
pub mod db;
pub mod error;
pub mod executor;

#[cfg(feature = "anyhow")]
pub mod anyhow_compat;

pub use context::StateTransaction;
pub use db::{StateDb, StateTx};
pub use error::{ErrorCode, Result, RpcError};
pub use executor::run_scoped;

#[cfg(feature = "anyhow")]
pub use anyhow_compat::run_scoped_anyhow;

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::context::StateTransaction;
    pub use crate::db::{StateDb, StateTx};
    pub use crate::error::{ErrorCode, Result, RpcError};
    pub use crate::executor::run_scoped;

    #[cfg(feature = "anyhow")]
    pub use crate::anyhow_compat::run_scoped_anyhow;
}
