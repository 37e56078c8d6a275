//! Coin amounts in minor units.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An amount of coins.
///
/// Stored as a signed 64-bit integer of minor units. Account balances never go
/// negative (the withdraw primitive refuses rather than overdraw), but the
/// type itself is a plain amount so projections and request payloads can carry
/// it before validation.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[serde(transparent)]
pub struct Coins(i64);

impl Coins {
    /// Wrap a raw minor-unit amount.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw minor-unit amount.
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Whether the amount is strictly positive.
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Coins {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
