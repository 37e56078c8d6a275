//! Tests for the ledger use cases.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use rstest::rstest;

use super::*;
use crate::domain::ports::{ConflictClass, MockLedgerStore, MockProductCatalog};
use crate::domain::{
    AccountId, ErrorCode, IncomingTransfer, InventoryItem, OutgoingTransfer, Product, ProductId,
    STARTING_BALANCE,
};

fn book() -> Product {
    Product {
        id: ProductId::new(3),
        name: "book".to_owned(),
        price: Coins::new(50),
    }
}

fn service(
    store: MockLedgerStore,
    catalog: MockProductCatalog,
) -> LedgerService<MockLedgerStore, MockProductCatalog> {
    LedgerService::new(Arc::new(store), Arc::new(catalog))
}

#[tokio::test]
async fn buy_item_debits_and_records_the_purchase() {
    let mut store = MockLedgerStore::new();
    store
        .expect_account_id_by_user()
        .withf(|user| *user == UserId::new(7))
        .return_once(|_| Ok(AccountId::new(70)));
    store
        .expect_purchase()
        .withf(|account, product| *account == AccountId::new(70) && product.name == "book")
        .times(1)
        .return_once(|_, _| Ok(()));

    let mut catalog = MockProductCatalog::new();
    catalog
        .expect_product_by_name()
        .withf(|name| name == "book")
        .return_once(|_| Ok(Some(book())));

    let result = service(store, catalog)
        .buy_item(UserId::new(7), "book")
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn buy_item_rejects_unknown_products_without_touching_the_ledger() {
    let mut store = MockLedgerStore::new();
    store
        .expect_account_id_by_user()
        .return_once(|_| Ok(AccountId::new(70)));
    store.expect_purchase().times(0);

    let mut catalog = MockProductCatalog::new();
    catalog.expect_product_by_name().return_once(|_| Ok(None));

    let error = service(store, catalog)
        .buy_item(UserId::new(7), "jujuju")
        .await
        .expect_err("unknown product");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "product not found");
}

#[tokio::test]
async fn buy_item_maps_unknown_users_to_not_found() {
    let mut store = MockLedgerStore::new();
    store
        .expect_account_id_by_user()
        .return_once(|_| Err(LedgerStoreError::not_found("account")));

    let catalog = MockProductCatalog::new();

    let error = service(store, catalog)
        .buy_item(UserId::new(9), "book")
        .await
        .expect_err("unknown user");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "user not found");
}

#[tokio::test]
async fn buy_item_surfaces_insufficient_balance_as_a_business_error() {
    let mut store = MockLedgerStore::new();
    store
        .expect_account_id_by_user()
        .return_once(|_| Ok(AccountId::new(70)));
    store
        .expect_purchase()
        .return_once(|_, _| Err(LedgerStoreError::insufficient_balance(40_i64, 50_i64)));

    let mut catalog = MockProductCatalog::new();
    catalog
        .expect_product_by_name()
        .return_once(|_| Ok(Some(book())));

    let error = service(store, catalog)
        .buy_item(UserId::new(7), "book")
        .await
        .expect_err("insufficient balance");
    assert_eq!(error.code(), ErrorCode::InsufficientBalance);
}

#[rstest]
#[case(0)]
#[case(-10)]
#[tokio::test]
async fn send_coin_rejects_non_positive_amounts_before_any_store_call(#[case] amount: i64) {
    let mut store = MockLedgerStore::new();
    store.expect_account_id_by_user().times(0);
    store.expect_transfer().times(0);

    let error = service(store, MockProductCatalog::new())
        .send_coin(UserId::new(1), "bob", Coins::new(amount))
        .await
        .expect_err("non-positive amount");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "amount must be positive");
}

#[tokio::test]
async fn send_coin_rejects_self_transfers_before_opening_a_transaction() {
    let mut store = MockLedgerStore::new();
    store
        .expect_account_id_by_user()
        .return_once(|_| Ok(AccountId::new(70)));
    store
        .expect_account_id_by_username()
        .withf(|name| name == "alice")
        .return_once(|_| Ok(AccountId::new(70)));
    store.expect_transfer().times(0);

    let error = service(store, MockProductCatalog::new())
        .send_coin(UserId::new(1), "alice", Coins::new(10))
        .await
        .expect_err("self transfer");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "you can't send coins to yourself");
}

#[tokio::test]
async fn send_coin_maps_unknown_recipients_to_not_found() {
    let mut store = MockLedgerStore::new();
    store
        .expect_account_id_by_user()
        .return_once(|_| Ok(AccountId::new(70)));
    store
        .expect_account_id_by_username()
        .return_once(|_| Err(LedgerStoreError::not_found("account")));
    store.expect_transfer().times(0);

    let error = service(store, MockProductCatalog::new())
        .send_coin(UserId::new(1), "nobody", Coins::new(10))
        .await
        .expect_err("unknown recipient");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn send_coin_transfers_between_distinct_accounts() {
    let mut store = MockLedgerStore::new();
    store
        .expect_account_id_by_user()
        .return_once(|_| Ok(AccountId::new(70)));
    store
        .expect_account_id_by_username()
        .return_once(|_| Ok(AccountId::new(80)));
    store
        .expect_transfer()
        .withf(|sender, recipient, amount| {
            *sender == AccountId::new(70)
                && *recipient == AccountId::new(80)
                && *amount == Coins::new(10)
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));

    let result = service(store, MockProductCatalog::new())
        .send_coin(UserId::new(1), "bob", Coins::new(10))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn exhausted_retries_surface_as_retries_exceeded() {
    let mut store = MockLedgerStore::new();
    store
        .expect_account_id_by_user()
        .return_once(|_| Ok(AccountId::new(70)));
    store
        .expect_account_id_by_username()
        .return_once(|_| Ok(AccountId::new(80)));
    store
        .expect_transfer()
        .return_once(|_, _, _| Err(LedgerStoreError::retries_exceeded(3_u32)));

    let error = service(store, MockProductCatalog::new())
        .send_coin(UserId::new(1), "bob", Coins::new(10))
        .await
        .expect_err("retries exceeded");
    assert_eq!(error.code(), ErrorCode::RetriesExceeded);
}

#[tokio::test]
async fn unretried_conflicts_map_to_internal_errors() {
    let mut store = MockLedgerStore::new();
    store
        .expect_account_id_by_user()
        .return_once(|_| Ok(AccountId::new(70)));
    store
        .expect_snapshot()
        .return_once(|_| Err(LedgerStoreError::conflict(ConflictClass::Serialization)));

    let error = service(store, MockProductCatalog::new())
        .get_info(UserId::new(1))
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn get_info_returns_the_snapshot() {
    let snapshot = AccountSnapshot {
        balance: Coins::new(90),
        inventory: vec![InventoryItem {
            name: "book".to_owned(),
            quantity: 2,
        }],
        incoming: vec![],
        outgoing: vec![],
    };
    let expected = snapshot.clone();

    let mut store = MockLedgerStore::new();
    store
        .expect_account_id_by_user()
        .return_once(|_| Ok(AccountId::new(70)));
    store.expect_snapshot().return_once(move |_| Ok(snapshot));

    let info = service(store, MockProductCatalog::new())
        .get_info(UserId::new(1))
        .await
        .expect("snapshot");
    assert_eq!(info, expected);
}

// ---------------------------------------------------------------------------
// End-to-end scenario over an in-memory ledger
// ---------------------------------------------------------------------------

/// Minimal in-memory ledger honouring the store contract: withdraw refuses to
/// overdraw, mutations and records land together, snapshots aggregate
/// purchases by product ordered by quantity descending.
#[derive(Default)]
struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    // account id -> (owner user, username, balance)
    accounts: HashMap<i64, (UserId, String, i64)>,
    // customer account -> product names bought
    purchases: Vec<(i64, String)>,
    // (sender account, recipient account, amount)
    transfers: Vec<(i64, i64, i64)>,
}

impl InMemoryLedger {
    fn with_account(self, account: i64, user: UserId, username: &str, balance: Coins) -> Self {
        self.state
            .lock()
            .expect("ledger state")
            .accounts
            .insert(account, (user, username.to_owned(), balance.value()));
        self
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn account_id_by_user(&self, user: UserId) -> Result<AccountId, LedgerStoreError> {
        let state = self.state.lock().expect("ledger state");
        state
            .accounts
            .iter()
            .find(|(_, (owner, _, _))| *owner == user)
            .map(|(id, _)| AccountId::new(*id))
            .ok_or_else(|| LedgerStoreError::not_found("account"))
    }

    async fn account_id_by_username(&self, username: &str) -> Result<AccountId, LedgerStoreError> {
        let state = self.state.lock().expect("ledger state");
        state
            .accounts
            .iter()
            .find(|(_, (_, name, _))| name == username)
            .map(|(id, _)| AccountId::new(*id))
            .ok_or_else(|| LedgerStoreError::not_found("account"))
    }

    async fn purchase(
        &self,
        account: AccountId,
        product: &Product,
    ) -> Result<(), LedgerStoreError> {
        let mut state = self.state.lock().expect("ledger state");
        let balance = state
            .accounts
            .get_mut(&account.value())
            .ok_or_else(|| LedgerStoreError::not_found("account"))?;
        if balance.2 < product.price.value() {
            return Err(LedgerStoreError::insufficient_balance(
                balance.2,
                product.price.value(),
            ));
        }
        balance.2 -= product.price.value();
        state.purchases.push((account.value(), product.name.clone()));
        Ok(())
    }

    async fn transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: Coins,
    ) -> Result<(), LedgerStoreError> {
        let mut state = self.state.lock().expect("ledger state");
        let sender_balance = state
            .accounts
            .get(&sender.value())
            .ok_or_else(|| LedgerStoreError::not_found("account"))?
            .2;
        if sender_balance < amount.value() {
            return Err(LedgerStoreError::insufficient_balance(
                sender_balance,
                amount.value(),
            ));
        }
        if let Some(entry) = state.accounts.get_mut(&sender.value()) {
            entry.2 -= amount.value();
        }
        if let Some(entry) = state.accounts.get_mut(&recipient.value()) {
            entry.2 += amount.value();
        }
        state
            .transfers
            .push((sender.value(), recipient.value(), amount.value()));
        Ok(())
    }

    async fn snapshot(&self, account: AccountId) -> Result<AccountSnapshot, LedgerStoreError> {
        let state = self.state.lock().expect("ledger state");
        let balance = state
            .accounts
            .get(&account.value())
            .ok_or_else(|| LedgerStoreError::not_found("account"))?
            .2;

        let mut quantities: HashMap<String, i64> = HashMap::new();
        for (customer, name) in &state.purchases {
            if *customer == account.value() {
                *quantities.entry(name.clone()).or_insert(0) += 1;
            }
        }
        let mut inventory: Vec<InventoryItem> = quantities
            .into_iter()
            .map(|(name, quantity)| InventoryItem { name, quantity })
            .collect();
        inventory.sort_by(|a, b| b.quantity.cmp(&a.quantity));

        let username_of = |id: i64| {
            state
                .accounts
                .get(&id)
                .map(|(_, name, _)| name.clone())
                .unwrap_or_default()
        };
        let incoming = state
            .transfers
            .iter()
            .filter(|(_, to, _)| *to == account.value())
            .map(|(from, _, amount)| IncomingTransfer {
                amount: Coins::new(*amount),
                sender_username: username_of(*from),
            })
            .collect();
        let outgoing = state
            .transfers
            .iter()
            .filter(|(from, _, _)| *from == account.value())
            .map(|(_, to, amount)| OutgoingTransfer {
                amount: Coins::new(*amount),
                recipient_username: username_of(*to),
            })
            .collect();

        Ok(AccountSnapshot {
            balance: Coins::new(balance),
            inventory,
            incoming,
            outgoing,
        })
    }
}

#[tokio::test]
async fn two_purchases_then_a_transfer_land_on_both_snapshots() {
    let ledger = Arc::new(
        InMemoryLedger::default()
            .with_account(70, UserId::new(1), "A", STARTING_BALANCE)
            .with_account(80, UserId::new(2), "B", STARTING_BALANCE),
    );

    let mut catalog = MockProductCatalog::new();
    catalog
        .expect_product_by_name()
        .returning(|_| Ok(Some(book())));

    let service = LedgerService::new(Arc::clone(&ledger), Arc::new(catalog));

    service.buy_item(UserId::new(1), "book").await.expect("first purchase");
    service.buy_item(UserId::new(1), "book").await.expect("second purchase");

    let info = service.get_info(UserId::new(1)).await.expect("info after purchases");
    assert_eq!(info.balance, Coins::new(90));
    assert_eq!(
        info.inventory,
        vec![InventoryItem {
            name: "book".to_owned(),
            quantity: 2,
        }]
    );

    service
        .send_coin(UserId::new(1), "B", Coins::new(10))
        .await
        .expect("transfer");

    let sender = service.get_info(UserId::new(1)).await.expect("sender info");
    assert_eq!(sender.balance, Coins::new(80));
    assert_eq!(sender.outgoing.len(), 1);
    assert_eq!(sender.outgoing[0].recipient_username, "B");

    let recipient = service.get_info(UserId::new(2)).await.expect("recipient info");
    assert_eq!(recipient.balance, Coins::new(200));
    assert_eq!(recipient.incoming.len(), 1);
    assert_eq!(recipient.incoming[0].sender_username, "A");
    assert_eq!(recipient.incoming[0].amount, Coins::new(10));
}

#[tokio::test]
async fn overdrawing_transfer_is_rejected_and_balances_are_untouched() {
    let ledger = Arc::new(
        InMemoryLedger::default()
            .with_account(70, UserId::new(1), "A", Coins::new(100))
            .with_account(80, UserId::new(2), "B", Coins::new(100)),
    );
    let service = LedgerService::new(Arc::clone(&ledger), Arc::new(MockProductCatalog::new()));

    let error = service
        .send_coin(UserId::new(1), "B", Coins::new(160))
        .await
        .expect_err("overdraw");
    assert_eq!(error.code(), ErrorCode::InsufficientBalance);

    let sender = service.get_info(UserId::new(1)).await.expect("sender info");
    assert_eq!(sender.balance, Coins::new(100));
    assert!(sender.outgoing.is_empty());
}
