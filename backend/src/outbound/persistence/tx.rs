//! Unit-of-work execution against the primary or replica pool.
//!
//! A unit of work is a closure run inside one database transaction at a
//! caller-chosen isolation level. The active transaction is the
//! `&mut AsyncPgConnection` handed to the closure, an explicit handle rather
//! than ambient state: repository primitives share a transaction only by
//! being composed inside the same closure, and accidentally opening a second
//! transaction mid-work is unrepresentable at call sites.

use diesel_async::AsyncPgConnection;
use diesel_async::scoped_futures::ScopedBoxFuture;

use crate::domain::ports::LedgerStoreError;

use super::error_map::map_pool_error;
use super::pool::DbPool;

/// Transaction isolation levels supported by the store.
///
/// Single-account mutations can run at the lower levels; multi-read
/// snapshots and multi-account mutations use [`Isolation::Serializable`] and
/// rely on conflict retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

/// Whether a unit of work mutates the ledger.
///
/// Write mode selects the primary; read mode may be served by the replica.
/// Balance-affecting reads (the locked read inside withdraw) always run in
/// write mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadWrite,
    ReadOnly,
}

/// Runs units of work, owning the primary and replica connection pools.
#[derive(Clone)]
pub struct TxExecutor {
    primary: DbPool,
    replica: DbPool,
}

impl TxExecutor {
    /// Create an executor over a primary pool and a replica pool.
    ///
    /// Deployments without a replica pass the primary pool twice.
    pub fn new(primary: DbPool, replica: DbPool) -> Self {
        Self { primary, replica }
    }

    /// The pool backing write-mode work. Also used for plain lookups that
    /// feed mutations, where a stale replica read would be misleading.
    pub fn primary(&self) -> &DbPool {
        &self.primary
    }

    /// Run `work` inside one transaction at the requested isolation level.
    ///
    /// Commits when `work` returns `Ok`, rolls back when it returns `Err`;
    /// the work error is returned unchanged. Begin and commit failures are
    /// classified through the same taxonomy as statement errors, so a
    /// conflict raised at commit time is still retryable. A panic inside
    /// `work` unwinds through the transaction guard: the connection is
    /// discarded as broken and the open transaction aborts with it, so a
    /// transaction is never left dangling.
    pub async fn run<'a, T, F>(
        &self,
        isolation: Isolation,
        mode: AccessMode,
        work: F,
    ) -> Result<T, LedgerStoreError>
    where
        F: for<'r> FnOnce(
                &'r mut AsyncPgConnection,
            ) -> ScopedBoxFuture<'a, 'r, Result<T, LedgerStoreError>>
            + Send
            + 'a,
        T: Send + 'a,
    {
        let pool = match mode {
            AccessMode::ReadWrite => &self.primary,
            AccessMode::ReadOnly => &self.replica,
        };
        let mut conn = pool.get().await.map_err(map_pool_error)?;

        let builder = conn.build_transaction();
        let builder = match isolation {
            Isolation::ReadCommitted => builder.read_committed(),
            Isolation::RepeatableRead => builder.repeatable_read(),
            Isolation::Serializable => builder.serializable(),
        };
        let mut builder = match mode {
            AccessMode::ReadWrite => builder.read_write(),
            AccessMode::ReadOnly => builder.read_only(),
        };

        builder.run(work).await
    }
}
