//! PostgreSQL-backed [`LedgerStore`] implementation.
//!
//! Each mutation is one serializable unit of work wrapped in the retry
//! controller; retrying re-runs the whole transaction from the beginning with
//! the original inputs, which is the only sound way to recover from a
//! serialization failure.

use async_trait::async_trait;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::domain::ports::{LedgerStore, LedgerStoreError};
use crate::domain::{AccountId, AccountSnapshot, Coins, Product, UserId};

use super::error_map::map_pool_error;
use super::ledger_sql;
use super::retry::{RetryError, RetryPolicy, with_retry};
use super::tx::{AccessMode, Isolation, TxExecutor};

/// Diesel-backed ledger store.
#[derive(Clone)]
pub struct DieselLedgerStore {
    tx: TxExecutor,
    retry: RetryPolicy,
}

impl DieselLedgerStore {
    /// Create a store running units of work through the given executor.
    pub fn new(tx: TxExecutor, retry: RetryPolicy) -> Self {
        Self { tx, retry }
    }
}

fn map_retry_error(error: RetryError<LedgerStoreError>) -> LedgerStoreError {
    match error {
        RetryError::Work(inner) => inner,
        RetryError::Exhausted { attempts } => LedgerStoreError::retries_exceeded(attempts),
    }
}

#[async_trait]
impl LedgerStore for DieselLedgerStore {
    async fn account_id_by_user(&self, user: UserId) -> Result<AccountId, LedgerStoreError> {
        let mut conn = self.tx.primary().get().await.map_err(map_pool_error)?;
        ledger_sql::account_id_by_user_id(&mut conn, user.value()).await
    }

    async fn account_id_by_username(
        &self,
        username: &str,
    ) -> Result<AccountId, LedgerStoreError> {
        let mut conn = self.tx.primary().get().await.map_err(map_pool_error)?;
        ledger_sql::account_id_by_username(&mut conn, username).await
    }

    async fn purchase(
        &self,
        account: AccountId,
        product: &Product,
    ) -> Result<(), LedgerStoreError> {
        let product_id = product.id;
        let price = product.price;
        let quantity = 1_i32;
        let total_price = Coins::new(price.value() * i64::from(quantity));

        with_retry(&self.retry, LedgerStoreError::is_transient, || {
            self.tx
                .run(Isolation::Serializable, AccessMode::ReadWrite, move |conn| {
                    async move {
                        ledger_sql::withdraw(conn, account, total_price).await?;
                        ledger_sql::insert_purchase_operation(
                            conn,
                            account,
                            product_id,
                            quantity,
                            total_price,
                        )
                        .await
                    }
                    .scope_boxed()
                })
        })
        .await
        .map_err(map_retry_error)
    }

    async fn transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: Coins,
    ) -> Result<(), LedgerStoreError> {
        with_retry(&self.retry, LedgerStoreError::is_transient, || {
            self.tx
                .run(Isolation::Serializable, AccessMode::ReadWrite, move |conn| {
                    async move {
                        ledger_sql::withdraw(conn, sender, amount).await?;
                        ledger_sql::deposit(conn, recipient, amount).await?;
                        ledger_sql::insert_transfer_operation(conn, sender, recipient, amount)
                            .await
                    }
                    .scope_boxed()
                })
        })
        .await
        .map_err(map_retry_error)
    }

    async fn snapshot(&self, account: AccountId) -> Result<AccountSnapshot, LedgerStoreError> {
        with_retry(&self.retry, LedgerStoreError::is_transient, || {
            self.tx
                .run(Isolation::Serializable, AccessMode::ReadOnly, move |conn| {
                    async move {
                        let balance = ledger_sql::balance(conn, account).await?;
                        let inventory = ledger_sql::purchases_by_account(conn, account).await?;
                        let incoming = ledger_sql::incoming_transfers(conn, account).await?;
                        let outgoing = ledger_sql::outgoing_transfers(conn, account).await?;

                        Ok(AccountSnapshot {
                            balance,
                            inventory,
                            incoming,
                            outgoing,
                        })
                    }
                    .scope_boxed()
                })
        })
        .await
        .map_err(map_retry_error)
    }
}
