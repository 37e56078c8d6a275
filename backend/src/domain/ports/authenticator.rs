//! Driving port for the authentication collaborator.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{Credentials, Error, UserId};

/// Token issuance and validation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate credentials and return a bearer token.
    ///
    /// An unknown username registers a new user (login-or-register); a known
    /// username with a wrong password fails with an unauthorized error.
    async fn issue_token(&self, credentials: Credentials) -> Result<String, Error>;

    /// Validate a bearer token and return the authenticated user id.
    fn parse_token(&self, token: &str) -> Result<UserId, Error>;
}
