//! Driving port for account-info reads.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{AccountSnapshot, Error, UserId};

/// Consistent account-info reads exposed to the delivery layer.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Return balance, inventory, and transfer history as one snapshot.
    async fn get_info(&self, user: UserId) -> Result<AccountSnapshot, Error>;
}
