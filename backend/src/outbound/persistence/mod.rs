//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! The persistence layer follows these principles:
//!
//! - **Explicit units of work**: the active transaction is a
//!   `&mut AsyncPgConnection` handle passed to repository primitives, never
//!   ambient state; [`TxExecutor`] is the only place transactions begin.
//! - **Closed error taxonomy**: Diesel errors are classified once, in
//!   `error_map`, into the domain's conflict/not-found/business/infra
//!   variants; nothing above this layer inspects SQLSTATEs.
//! - **Bounded retry**: serializable units of work are wrapped in
//!   [`RetryPolicy`]-bounded retry, with terminal business errors exempt.

mod diesel_ledger_store;
mod diesel_product_catalog;
mod diesel_user_repository;
mod error_map;
mod ledger_sql;
mod models;
mod pool;
mod retry;
mod schema;
mod tx;

pub use diesel_ledger_store::DieselLedgerStore;
pub use diesel_product_catalog::DieselProductCatalog;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
pub use retry::{RetryError, RetryPolicy, with_retry};
pub use tx::{AccessMode, Isolation, TxExecutor};
