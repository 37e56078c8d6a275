//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_query;
mod authenticator;
mod ledger_store;
mod operation_command;
mod password_hasher;
mod product_catalog;
mod user_repository;

pub use account_query::AccountQuery;
#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use authenticator::Authenticator;
#[cfg(test)]
pub use authenticator::MockAuthenticator;
pub use ledger_store::{ConflictClass, LedgerStore, LedgerStoreError};
#[cfg(test)]
pub use ledger_store::MockLedgerStore;
pub use operation_command::OperationCommand;
#[cfg(test)]
pub use operation_command::MockOperationCommand;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use product_catalog::{ProductCatalog, ProductCatalogError};
#[cfg(test)]
pub use product_catalog::MockProductCatalog;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
