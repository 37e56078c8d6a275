//! Driven port for the transactional coin ledger.
//!
//! The adapter behind this port owns the unit-of-work machinery: each
//! mutation method is one atomic transaction (retried on transient conflict),
//! and [`LedgerStore::snapshot`] assembles its projections against a single
//! transaction snapshot. Callers never see a partially applied operation.

use std::fmt;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{AccountId, AccountSnapshot, Coins, Product, UserId};

use super::define_port_error;

/// Transient conflict classes reported by the store.
///
/// These are the only errors a retry loop is allowed to treat as retryable;
/// everything else is terminal. Classification happens once, at the
/// persistence boundary, so no caller inspects store-specific codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictClass {
    /// Serializable transactions could not be ordered (SQLSTATE 40001).
    Serialization,
    /// Two transactions locked rows in opposite order (SQLSTATE 40P01).
    Deadlock,
    /// A row lock could not be acquired in time (SQLSTATE 55P03).
    LockNotAvailable,
}

impl fmt::Display for ConflictClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Serialization => "serialization failure",
            Self::Deadlock => "deadlock detected",
            Self::LockNotAvailable => "lock not available",
        };
        write!(f, "{name}")
    }
}

define_port_error! {
    /// Errors raised by ledger store adapters.
    pub enum LedgerStoreError {
        /// The store reported a transient conflict; the operation was rolled
        /// back and may be retried from scratch.
        Conflict { class: ConflictClass } => "transient conflict: {class}",
        /// A referenced row does not exist.
        NotFound { entity: String } => "{entity} not found",
        /// The locked balance read found fewer coins than requested; nothing
        /// was mutated.
        InsufficientBalance { balance: i64, requested: i64 } =>
            "not enough balance: have {balance}, need {requested}",
        /// Conflict retries were exhausted without a successful commit.
        RetriesExceeded { attempts: u32 } =>
            "transaction retries exceeded after {attempts} attempts",
        /// A connection could not be checked out of the pool.
        Connection { message: String } => "ledger store connection failed: {message}",
        /// Query execution failed for a non-conflict reason.
        Query { message: String } => "ledger store query failed: {message}",
    }
}

impl LedgerStoreError {
    /// Whether a retry loop may re-attempt the operation.
    ///
    /// This is the single point distinguishing transient conflicts from
    /// terminal errors; in particular `InsufficientBalance` is always
    /// terminal.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Atomic ledger operations backed by the relational store.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Resolve the account owned by a user.
    async fn account_id_by_user(&self, user: UserId) -> Result<AccountId, LedgerStoreError>;

    /// Resolve the account owned by the user with the given username.
    async fn account_id_by_username(&self, username: &str) -> Result<AccountId, LedgerStoreError>;

    /// Debit the account by the product price and append the purchase record,
    /// atomically.
    async fn purchase(&self, account: AccountId, product: &Product)
        -> Result<(), LedgerStoreError>;

    /// Debit the sender, credit the recipient, and append the transfer
    /// record, atomically.
    async fn transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: Coins,
    ) -> Result<(), LedgerStoreError>;

    /// Read balance, aggregated inventory, and transfer history from one
    /// transaction snapshot.
    async fn snapshot(&self, account: AccountId) -> Result<AccountSnapshot, LedgerStoreError>;
}
