//! Ledger use cases: buy an item, send coins, read account info.
//!
//! The service validates input and resolves identifiers before any
//! transaction opens; the atomic parts (debit + record, debit + credit +
//! record, snapshot reads) are delegated to the [`LedgerStore`] port, whose
//! adapter runs them as serializable units of work with conflict retry.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::ports::{
    AccountQuery, LedgerStore, LedgerStoreError, OperationCommand, ProductCatalog,
    ProductCatalogError,
};
use crate::domain::{AccountSnapshot, Coins, Error, UserId};

const USER_NOT_FOUND: &str = "user not found";
const PRODUCT_NOT_FOUND: &str = "product not found";
const NOT_ENOUGH_BALANCE: &str = "not enough balance to perform this operation";
const SELF_TRANSFER: &str = "you can't send coins to yourself";
const INVALID_AMOUNT: &str = "amount must be positive";

/// Map ledger store errors to domain errors.
///
/// Not-found is mapped by the call sites that know which entity was being
/// resolved; everything arriving here is either a business signal or an
/// infrastructure failure.
fn map_store_error(error: LedgerStoreError) -> Error {
    match error {
        LedgerStoreError::InsufficientBalance { .. } => {
            Error::insufficient_balance(NOT_ENOUGH_BALANCE)
        }
        LedgerStoreError::RetriesExceeded { attempts } => Error::retries_exceeded(format!(
            "operation kept conflicting with concurrent requests ({attempts} attempts)"
        )),
        LedgerStoreError::NotFound { entity } => Error::not_found(format!("{entity} not found")),
        other => Error::internal(other.to_string()),
    }
}

/// Translate an account lookup failure, turning not-found into the API's
/// user-not-found condition.
fn map_account_lookup_error(error: LedgerStoreError) -> Error {
    match error {
        LedgerStoreError::NotFound { .. } => Error::not_found(USER_NOT_FOUND),
        other => map_store_error(other),
    }
}

fn map_catalog_error(error: ProductCatalogError) -> Error {
    Error::internal(error.to_string())
}

/// Ledger service implementing the operation and account driving ports.
#[derive(Clone)]
pub struct LedgerService<S, C> {
    store: Arc<S>,
    catalog: Arc<C>,
}

impl<S, C> LedgerService<S, C> {
    /// Create a new service over the ledger store and catalog ports.
    pub fn new(store: Arc<S>, catalog: Arc<C>) -> Self {
        Self { store, catalog }
    }
}

#[async_trait]
impl<S, C> OperationCommand for LedgerService<S, C>
where
    S: LedgerStore,
    C: ProductCatalog,
{
    #[instrument(skip(self))]
    async fn buy_item(&self, user: UserId, item: &str) -> Result<(), Error> {
        let account = self
            .store
            .account_id_by_user(user)
            .await
            .map_err(map_account_lookup_error)?;

        let product = self
            .catalog
            .product_by_name(item)
            .await
            .map_err(map_catalog_error)?
            .ok_or_else(|| Error::not_found(PRODUCT_NOT_FOUND))?;

        self.store
            .purchase(account, &product)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self))]
    async fn send_coin(&self, user: UserId, recipient: &str, amount: Coins) -> Result<(), Error> {
        if !amount.is_positive() {
            return Err(Error::invalid_request(INVALID_AMOUNT));
        }

        let sender_account = self
            .store
            .account_id_by_user(user)
            .await
            .map_err(map_account_lookup_error)?;

        let recipient_account = self
            .store
            .account_id_by_username(recipient)
            .await
            .map_err(map_account_lookup_error)?;

        if sender_account == recipient_account {
            return Err(Error::invalid_request(SELF_TRANSFER));
        }

        self.store
            .transfer(sender_account, recipient_account, amount)
            .await
            .map_err(map_store_error)
    }
}

#[async_trait]
impl<S, C> AccountQuery for LedgerService<S, C>
where
    S: LedgerStore,
    C: ProductCatalog,
{
    #[instrument(skip(self))]
    async fn get_info(&self, user: UserId) -> Result<AccountSnapshot, Error> {
        let account = self
            .store
            .account_id_by_user(user)
            .await
            .map_err(map_account_lookup_error)?;

        self.store.snapshot(account).await.map_err(map_store_error)
    }
}

#[cfg(test)]
#[path = "ledger_service_tests.rs"]
mod tests;
