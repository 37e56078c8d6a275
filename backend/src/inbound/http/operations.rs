//! Ledger mutation endpoints.
//!
//! ```text
//! POST /api/sendCoin
//! GET  /api/buy/{item}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Coins, Error};
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::{ApiResult, ErrorBody};
use crate::inbound::http::state::HttpState;

/// Request payload for sending coins.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    /// Recipient username.
    pub to_user: String,
    /// Amount of coins to transfer.
    pub amount: i64,
}

/// Send coins to another user.
#[utoipa::path(
    post,
    path = "/api/sendCoin",
    tags = ["operations"],
    request_body = SendCoinRequest,
    responses(
        (status = 200, description = "Transfer applied"),
        (status = 400, description = "Validation or business failure", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 503, description = "Conflict retries exhausted", body = ErrorBody)
    )
)]
#[post("/api/sendCoin")]
pub async fn send_coin(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    body: web::Json<SendCoinRequest>,
) -> ApiResult<HttpResponse> {
    let SendCoinRequest { to_user, amount } = body.into_inner();
    if to_user.is_empty() {
        return Err(Error::invalid_request("toUser is required"));
    }

    state
        .operations
        .send_coin(user.0, &to_user, Coins::new(amount))
        .await?;

    Ok(HttpResponse::Ok().finish())
}

/// Buy one unit of the named catalog item.
#[utoipa::path(
    get,
    path = "/api/buy/{item}",
    tags = ["operations"],
    params(("item" = String, Path, description = "Catalog item name")),
    responses(
        (status = 200, description = "Purchase applied"),
        (status = 400, description = "Unknown item or not enough balance", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 503, description = "Conflict retries exhausted", body = ErrorBody)
    )
)]
#[get("/api/buy/{item}")]
pub async fn buy_item(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let item = path.into_inner();

    state.operations.buy_item(user.0, &item).await?;

    Ok(HttpResponse::Ok().finish())
}
