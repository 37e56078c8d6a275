//! Coin-ledger merch store backend.
//!
//! Users hold coin balances, transfer coins to one another, and buy
//! merchandise. The interesting part is not the HTTP surface but the
//! transactional core: serializable units of work with bounded conflict
//! retry guarantee race-free balance mutation and consistent multi-table
//! snapshots. See `domain::ports` for the hexagonal boundary and
//! `outbound::persistence` for the unit-of-work machinery.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
