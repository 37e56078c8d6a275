//! Single-point mapping from Diesel errors to the ledger error taxonomy.
//!
//! Conflict classification happens here and nowhere else: the retry
//! controller and the domain only ever see the closed
//! [`ConflictClass`]/[`LedgerStoreError`] variants, never SQLSTATEs or
//! driver-specific messages.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{ConflictClass, LedgerStoreError};

use super::pool::PoolError;

/// Map pool checkout failures to the connection variant.
pub(crate) fn map_pool_error(error: PoolError) -> LedgerStoreError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    LedgerStoreError::connection(message)
}

/// Classify a database error as one of the store's transient conflict
/// classes, if it is one.
///
/// Diesel surfaces serialization failures as a dedicated kind; deadlocks
/// (40P01) and lock-wait failures (55P03) arrive as unknown kinds and are
/// recognised by the server's message text.
fn classify_conflict(
    kind: &DatabaseErrorKind,
    info: &(dyn DatabaseErrorInformation + Send + Sync),
) -> Option<ConflictClass> {
    if matches!(kind, DatabaseErrorKind::SerializationFailure) {
        return Some(ConflictClass::Serialization);
    }

    let message = info.message();
    if message.contains("deadlock detected") {
        return Some(ConflictClass::Deadlock);
    }
    if message.contains("could not obtain lock") || message.contains("lock timeout") {
        return Some(ConflictClass::LockNotAvailable);
    }

    None
}

/// Map a Diesel error to the ledger error taxonomy.
pub(crate) fn map_diesel_error(error: DieselError) -> LedgerStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "ledger statement failed");
            if let Some(class) = classify_conflict(kind, info.as_ref()) {
                return LedgerStoreError::conflict(class);
            }
            if matches!(kind, DatabaseErrorKind::ClosedConnection) {
                return LedgerStoreError::connection(info.message().to_owned());
            }
            LedgerStoreError::query(info.message().to_owned())
        }
        DieselError::NotFound => LedgerStoreError::not_found("record"),
        _ => LedgerStoreError::query(error.to_string()),
    }
}

// Required by the diesel-async transaction builder so begin/commit failures
// land in the same taxonomy; a serialization failure raised at commit time is
// still classified as retryable.
impl From<DieselError> for LedgerStoreError {
    fn from(error: DieselError) -> Self {
        map_diesel_error(error)
    }
}
