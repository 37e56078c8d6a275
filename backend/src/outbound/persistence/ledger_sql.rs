//! Ledger repository primitives.
//!
//! Every function takes the active transaction as an explicit
//! `&mut AsyncPgConnection` parameter; callers compose them inside one unit
//! of work to make a multi-statement operation atomic. None of these open or
//! commit transactions themselves.

use diesel::dsl::sum;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::LedgerStoreError;
use crate::domain::{
    AccountId, Coins, IncomingTransfer, InventoryItem, OutgoingTransfer, ProductId,
};

use super::error_map::map_diesel_error;
use super::schema::{accounts, operations, products, purchase_operations, transfer_operations,
    users};

const OPERATION_PURCHASE: &str = "purchase";
const OPERATION_TRANSFER: &str = "transfer";

/// Resolve the account owned by the given user.
pub(crate) async fn account_id_by_user_id(
    conn: &mut AsyncPgConnection,
    user_id: i64,
) -> Result<AccountId, LedgerStoreError> {
    accounts::table
        .filter(accounts::user_id.eq(user_id))
        .select(accounts::id)
        .first::<i64>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .map(AccountId::new)
        .ok_or_else(|| LedgerStoreError::not_found("account"))
}

/// Resolve the account owned by the user with the given username.
pub(crate) async fn account_id_by_username(
    conn: &mut AsyncPgConnection,
    username: &str,
) -> Result<AccountId, LedgerStoreError> {
    accounts::table
        .inner_join(users::table)
        .filter(users::username.eq(username))
        .select(accounts::id)
        .first::<i64>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .map(AccountId::new)
        .ok_or_else(|| LedgerStoreError::not_found("account"))
}

/// Read the current balance.
pub(crate) async fn balance(
    conn: &mut AsyncPgConnection,
    account: AccountId,
) -> Result<Coins, LedgerStoreError> {
    accounts::table
        .find(account.value())
        .select(accounts::balance)
        .first::<i64>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .map(Coins::new)
        .ok_or_else(|| LedgerStoreError::not_found("account"))
}

/// Debit the account, refusing to overdraw.
///
/// The balance is read under an exclusive row lock (`SELECT … FOR UPDATE`),
/// so two concurrent withdrawals on the same account cannot both observe a
/// stale sufficient balance: whichever acquires the lock first decrements
/// before the other is admitted. An insufficient balance leaves the row
/// untouched and is terminal for the enclosing retry loop.
pub(crate) async fn withdraw(
    conn: &mut AsyncPgConnection,
    account: AccountId,
    amount: Coins,
) -> Result<(), LedgerStoreError> {
    let current: i64 = accounts::table
        .find(account.value())
        .select(accounts::balance)
        .for_update()
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| LedgerStoreError::not_found("account"))?;

    if current < amount.value() {
        return Err(LedgerStoreError::insufficient_balance(
            current,
            amount.value(),
        ));
    }

    diesel::update(accounts::table.find(account.value()))
        .set(accounts::balance.eq(accounts::balance - amount.value()))
        .execute(conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(())
}

/// Credit the account unconditionally.
pub(crate) async fn deposit(
    conn: &mut AsyncPgConnection,
    account: AccountId,
    amount: Coins,
) -> Result<(), LedgerStoreError> {
    let updated = diesel::update(accounts::table.find(account.value()))
        .set(accounts::balance.eq(accounts::balance + amount.value()))
        .execute(conn)
        .await
        .map_err(map_diesel_error)?;

    if updated == 0 {
        return Err(LedgerStoreError::not_found("account"));
    }

    Ok(())
}

/// Insert a purchase operation header and its detail row.
///
/// Header and detail land in the caller's transaction, so they are never
/// visible independently.
pub(crate) async fn insert_purchase_operation(
    conn: &mut AsyncPgConnection,
    customer: AccountId,
    product: ProductId,
    quantity: i32,
    total_price: Coins,
) -> Result<(), LedgerStoreError> {
    let operation_id: i64 = diesel::insert_into(operations::table)
        .values((
            operations::account_id.eq(customer.value()),
            operations::operation_type.eq(OPERATION_PURCHASE),
        ))
        .returning(operations::id)
        .get_result(conn)
        .await
        .map_err(map_diesel_error)?;

    diesel::insert_into(purchase_operations::table)
        .values((
            purchase_operations::operation_id.eq(operation_id),
            purchase_operations::product_id.eq(product.value()),
            purchase_operations::customer_account_id.eq(customer.value()),
            purchase_operations::quantity.eq(quantity),
            purchase_operations::total_price.eq(total_price.value()),
        ))
        .execute(conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(())
}

/// Insert a transfer operation header and its detail row.
pub(crate) async fn insert_transfer_operation(
    conn: &mut AsyncPgConnection,
    sender: AccountId,
    recipient: AccountId,
    amount: Coins,
) -> Result<(), LedgerStoreError> {
    let operation_id: i64 = diesel::insert_into(operations::table)
        .values((
            operations::account_id.eq(sender.value()),
            operations::operation_type.eq(OPERATION_TRANSFER),
        ))
        .returning(operations::id)
        .get_result(conn)
        .await
        .map_err(map_diesel_error)?;

    diesel::insert_into(transfer_operations::table)
        .values((
            transfer_operations::operation_id.eq(operation_id),
            transfer_operations::sender_account_id.eq(sender.value()),
            transfer_operations::recipient_account_id.eq(recipient.value()),
            transfer_operations::amount.eq(amount.value()),
        ))
        .execute(conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(())
}

/// Purchases aggregated by product, ordered by quantity descending.
pub(crate) async fn purchases_by_account(
    conn: &mut AsyncPgConnection,
    account: AccountId,
) -> Result<Vec<InventoryItem>, LedgerStoreError> {
    let rows: Vec<(String, Option<i64>)> = purchase_operations::table
        .inner_join(products::table)
        .filter(purchase_operations::customer_account_id.eq(account.value()))
        .group_by(products::name)
        .select((products::name, sum(purchase_operations::quantity)))
        .order_by(sum(purchase_operations::quantity).desc())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(rows
        .into_iter()
        .map(|(name, quantity)| InventoryItem {
            name,
            quantity: quantity.unwrap_or(0),
        })
        .collect())
}

/// Transfers received by the account, with sender usernames.
pub(crate) async fn incoming_transfers(
    conn: &mut AsyncPgConnection,
    account: AccountId,
) -> Result<Vec<IncomingTransfer>, LedgerStoreError> {
    let rows: Vec<(i64, String)> = transfer_operations::table
        .inner_join(
            accounts::table.on(accounts::id.eq(transfer_operations::sender_account_id)),
        )
        .inner_join(users::table.on(users::id.eq(accounts::user_id)))
        .filter(transfer_operations::recipient_account_id.eq(account.value()))
        .order_by(transfer_operations::operation_id.asc())
        .select((transfer_operations::amount, users::username))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(rows
        .into_iter()
        .map(|(amount, sender_username)| IncomingTransfer {
            amount: Coins::new(amount),
            sender_username,
        })
        .collect())
}

/// Transfers sent by the account, with recipient usernames.
pub(crate) async fn outgoing_transfers(
    conn: &mut AsyncPgConnection,
    account: AccountId,
) -> Result<Vec<OutgoingTransfer>, LedgerStoreError> {
    let rows: Vec<(i64, String)> = transfer_operations::table
        .inner_join(
            accounts::table.on(accounts::id.eq(transfer_operations::recipient_account_id)),
        )
        .inner_join(users::table.on(users::id.eq(accounts::user_id)))
        .filter(transfer_operations::sender_account_id.eq(account.value()))
        .order_by(transfer_operations::operation_id.asc())
        .select((transfer_operations::amount, users::username))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(rows
        .into_iter()
        .map(|(amount, recipient_username)| OutgoingTransfer {
            amount: Coins::new(amount),
            recipient_username,
        })
        .collect())
}
