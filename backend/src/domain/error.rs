//! Domain-level error type.
//!
//! Transport agnostic: inbound adapters map these to HTTP status codes and the
//! JSON error envelope; the domain only decides the failure category.

use std::fmt;

/// Stable machine-readable category describing the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The request is malformed or fails validation (non-positive amount,
    /// self-transfer, missing field).
    InvalidRequest,
    /// Authentication failed: bad password, invalid or expired token.
    Unauthorized,
    /// A referenced user, account, or product does not exist.
    NotFound,
    /// The locked balance read found fewer coins than the operation needs.
    InsufficientBalance,
    /// Transaction attempts were exhausted on transient conflicts.
    RetriesExceeded,
    /// An unexpected error occurred inside the domain or its collaborators.
    InternalError,
}

/// Domain error payload carried from services to adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Create a new error with an explicit code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Machine-readable failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::InsufficientBalance`].
    pub fn insufficient_balance(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InsufficientBalance, message)
    }

    /// Convenience constructor for [`ErrorCode::RetriesExceeded`].
    pub fn retries_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RetriesExceeded, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
