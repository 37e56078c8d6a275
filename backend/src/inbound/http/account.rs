//! Account info endpoint.
//!
//! ```text
//! GET /api/info
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::AccountSnapshot;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::{ApiResult, ErrorBody};
use crate::inbound::http::state::HttpState;

/// Aggregated inventory entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct InventoryEntry {
    /// Product name.
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: i64,
}

/// A transfer received from another user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedEntry {
    pub from_user: String,
    pub amount: i64,
}

/// A transfer sent to another user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SentEntry {
    pub to_user: String,
    pub amount: i64,
}

/// Transfer history split by direction; empty directions are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct CoinHistory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<Vec<ReceivedEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent: Option<Vec<SentEntry>>,
}

/// Response payload for the info endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    /// Current balance in coins.
    pub coins: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Vec<InventoryEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin_history: Option<CoinHistory>,
}

impl From<AccountSnapshot> for InfoResponse {
    fn from(snapshot: AccountSnapshot) -> Self {
        let inventory = (!snapshot.inventory.is_empty()).then(|| {
            snapshot
                .inventory
                .into_iter()
                .map(|item| InventoryEntry {
                    item_type: item.name,
                    quantity: item.quantity,
                })
                .collect()
        });

        let received = (!snapshot.incoming.is_empty()).then(|| {
            snapshot
                .incoming
                .into_iter()
                .map(|transfer| ReceivedEntry {
                    from_user: transfer.sender_username,
                    amount: transfer.amount.value(),
                })
                .collect()
        });
        let sent = (!snapshot.outgoing.is_empty()).then(|| {
            snapshot
                .outgoing
                .into_iter()
                .map(|transfer| SentEntry {
                    to_user: transfer.recipient_username,
                    amount: transfer.amount.value(),
                })
                .collect()
        });
        let coin_history = (received.is_some() || sent.is_some())
            .then_some(CoinHistory { received, sent });

        Self {
            coins: snapshot.balance.value(),
            inventory,
            coin_history,
        }
    }
}

/// Return the caller's balance, inventory, and transfer history.
#[utoipa::path(
    get,
    path = "/api/info",
    tags = ["account"],
    responses(
        (status = 200, description = "Consistent account snapshot", body = InfoResponse),
        (status = 400, description = "Unknown user", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 503, description = "Conflict retries exhausted", body = ErrorBody)
    )
)]
#[get("/api/info")]
pub async fn get_info(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<InfoResponse>> {
    let snapshot = state.account.get_info(user.0).await?;

    Ok(web::Json(InfoResponse::from(snapshot)))
}
