//! Driven port for password hashing.

#[cfg(test)]
use mockall::automock;

use super::define_port_error;

define_port_error! {
    /// Errors raised while hashing a password.
    pub enum PasswordHashError {
        /// The hashing backend rejected the input.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// One-way password hashing and verification.
#[cfg_attr(test, automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
