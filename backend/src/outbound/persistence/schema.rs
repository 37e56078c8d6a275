//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered users owned by the authentication collaborator.
    users (id) {
        id -> Int8,
        username -> Text,
        password_hash -> Text,
    }
}

diesel::table! {
    /// Mutable source of truth for coin balances, one row per user.
    accounts (id) {
        id -> Int8,
        user_id -> Int8,
        balance -> Int8,
    }
}

diesel::table! {
    /// Immutable merchandise catalog.
    products (id) {
        id -> Int8,
        name -> Text,
        price -> Int8,
    }
}

diesel::table! {
    /// Append-only operation log headers; `operation_type` discriminates the
    /// detail table (`purchase` or `transfer`).
    operations (id) {
        id -> Int8,
        account_id -> Int8,
        operation_type -> Text,
    }
}

diesel::table! {
    /// Purchase detail rows, one per purchase operation header.
    purchase_operations (operation_id) {
        operation_id -> Int8,
        product_id -> Int8,
        customer_account_id -> Int8,
        quantity -> Int4,
        total_price -> Int8,
    }
}

diesel::table! {
    /// Transfer detail rows, one per transfer operation header.
    transfer_operations (operation_id) {
        operation_id -> Int8,
        sender_account_id -> Int8,
        recipient_account_id -> Int8,
        amount -> Int8,
    }
}

diesel::joinable!(accounts -> users (user_id));
diesel::joinable!(operations -> accounts (account_id));
diesel::joinable!(purchase_operations -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    accounts,
    products,
    operations,
    purchase_operations,
    transfer_operations,
);
