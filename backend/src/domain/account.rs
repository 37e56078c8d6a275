//! Accounts and the consistent account-info snapshot.

use std::fmt;

use super::Coins;

/// Balance granted to every account at registration.
pub const STARTING_BALANCE: Coins = Coins::new(190);

/// Ledger account identifier.
///
/// Distinct from [`super::UserId`]: the account row is the mutable source of
/// truth for the balance, created exactly once per user and never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(i64);

impl AccountId {
    /// Wrap a raw identifier.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw identifier.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line of the aggregated purchase inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    /// Product name.
    pub name: String,
    /// Total quantity purchased across all purchase operations.
    pub quantity: i64,
}

/// A transfer received by the account being inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingTransfer {
    pub amount: Coins,
    pub sender_username: String,
}

/// A transfer sent by the account being inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingTransfer {
    pub amount: Coins,
    pub recipient_username: String,
}

/// Balance, inventory, and transfer history read from one transaction
/// snapshot.
///
/// All four projections are assembled inside a single serializable read-only
/// unit of work, so the balance and the transfer lists are mutually
/// consistent: a concurrent transfer is either reflected in all of them or in
/// none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountSnapshot {
    pub balance: Coins,
    /// Purchases aggregated by product, ordered by quantity descending.
    pub inventory: Vec<InventoryItem>,
    pub incoming: Vec<IncomingTransfer>,
    pub outgoing: Vec<OutgoingTransfer>,
}
