use async_trait::async_trait;

/// Capability to begin a state transaction.
///
/// This is the seam between the scope executor and the database client.
/// Production code gets a ready-made implementation for
/// [`sqlx::MySqlPool`](sqlx::MySqlPool) (see [`crate::context`]); tests
/// implement it with fakes.
#[async_trait]
pub trait StateDb: Send + Sync {
    /// The transaction handle this database hands out.
    type Tx: StateTx;

    /// Begins a new transaction, yielding a handle or the low-level driver
    /// error.
    async fn begin_tx(&self) -> Result<Self::Tx, sqlx::Error>;
}

/// Lifecycle of an open state transaction.
///
/// Both finalizers consume the handle, so a transaction can be committed or
/// rolled back at most once, and never both.
#[async_trait]
pub trait StateTx: Send {
    /// Commits the transaction.
    async fn commit(self) -> Result<(), sqlx::Error>;

    /// Rolls the transaction back.
    async fn rollback(self) -> Result<(), sqlx::Error>;
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Call counters shared between a [`FakeDb`] and the handles it issues.
    #[derive(Default)]
    pub(crate) struct Calls {
        pub begins: AtomicUsize,
        pub commits: AtomicUsize,
        pub rollbacks: AtomicUsize,
    }

    impl Calls {
        pub fn begins(&self) -> usize {
            self.begins.load(Ordering::SeqCst)
        }

        pub fn commits(&self) -> usize {
            self.commits.load(Ordering::SeqCst)
        }

        pub fn rollbacks(&self) -> usize {
            self.rollbacks.load(Ordering::SeqCst)
        }
    }

    /// In-memory stand-in for a database, with injectable failures.
    pub(crate) struct FakeDb {
        pub calls: Arc<Calls>,
        begin_error: Option<String>,
        commit_error: Option<String>,
        rollback_error: Option<String>,
    }

    impl FakeDb {
        pub fn healthy() -> Self {
            FakeDb {
                calls: Arc::default(),
                begin_error: None,
                commit_error: None,
                rollback_error: None,
            }
        }

        pub fn failing_begin(message: &str) -> Self {
            FakeDb {
                begin_error: Some(message.to_owned()),
                ..Self::healthy()
            }
        }

        pub fn failing_commit(message: &str) -> Self {
            FakeDb {
                commit_error: Some(message.to_owned()),
                ..Self::healthy()
            }
        }

        pub fn failing_rollback(message: &str) -> Self {
            FakeDb {
                rollback_error: Some(message.to_owned()),
                ..Self::healthy()
            }
        }
    }

    pub(crate) struct FakeTx {
        calls: Arc<Calls>,
        commit_error: Option<String>,
        rollback_error: Option<String>,
    }

    #[async_trait]
    impl StateDb for FakeDb {
        type Tx = FakeTx;

        async fn begin_tx(&self) -> Result<FakeTx, sqlx::Error> {
            self.calls.begins.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.begin_error {
                return Err(sqlx::Error::Protocol(message.clone()));
            }
            Ok(FakeTx {
                calls: Arc::clone(&self.calls),
                commit_error: self.commit_error.clone(),
                rollback_error: self.rollback_error.clone(),
            })
        }
    }

    #[async_trait]
    impl StateTx for FakeTx {
        async fn commit(self) -> Result<(), sqlx::Error> {
            self.calls.commits.fetch_add(1, Ordering::SeqCst);
            match self.commit_error {
                Some(message) => Err(sqlx::Error::Protocol(message)),
                None => Ok(()),
            }
        }

        async fn rollback(self) -> Result<(), sqlx::Error> {
            self.calls.rollbacks.fetch_add(1, Ordering::SeqCst);
            match self.rollback_error {
                Some(message) => Err(sqlx::Error::Protocol(message)),
                None => Ok(()),
            }
        }
    }
}
