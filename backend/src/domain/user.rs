//! Users and credentials.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric user identifier assigned at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw identifier.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user as stored by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Identifier assigned at registration.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Bcrypt hash of the password.
    pub password_hash: String,
}

/// Login credentials as submitted to the auth endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
