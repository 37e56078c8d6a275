//! Driving port for ledger mutations.
//!
//! Inbound adapters call this port with the authenticated user id; the
//! implementation validates, resolves identifiers, and delegates to the
//! transactional ledger store.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{Coins, Error, UserId};

/// Ledger mutations exposed to the delivery layer.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OperationCommand: Send + Sync {
    /// Buy one unit of the named catalog item with the user's coins.
    async fn buy_item(&self, user: UserId, item: &str) -> Result<(), Error>;

    /// Send coins from the user to the named recipient.
    async fn send_coin(&self, user: UserId, recipient: &str, amount: Coins) -> Result<(), Error>;
}
