//! Bcrypt adapter for the [`PasswordHasher`] port.

use tracing::debug;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Password hasher backed by bcrypt with the library's default cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptHasher;

impl BcryptHasher {
    /// Create a hasher.
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(err) => {
                // A malformed stored hash is indistinguishable from a bad
                // password for the caller; log it for operators.
                debug!(%err, "bcrypt verification failed");
                false
            }
        }
    }
}
