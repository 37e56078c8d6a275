//! Driven port for user persistence.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{Coins, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// A connection could not be checked out of the pool.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// User storage owned by the authentication collaborator.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by username.
    async fn find_by_username(&self, username: &str)
        -> Result<Option<User>, UserPersistenceError>;

    /// Register a new user and their ledger account with the given starting
    /// balance, atomically. Returns the new user's identifier.
    async fn register(
        &self,
        username: &str,
        password_hash: &str,
        starting_balance: Coins,
    ) -> Result<UserId, UserPersistenceError>;
}
