//! Authentication endpoint and bearer-token extraction.
//!
//! ```text
//! POST /api/auth
//! ```
//!
//! Handlers that need the caller's identity take an [`AuthenticatedUser`]
//! parameter; extraction parses the `Authorization: Bearer` header and
//! validates the token through the [`Authenticator`] port.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Credentials, Error, UserId};
use crate::inbound::http::error::{ApiResult, ErrorBody};
use crate::inbound::http::state::HttpState;

/// Request payload for the auth endpoint.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Response payload carrying the bearer token.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

/// Authenticate (or register) and return a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth",
    tags = ["auth"],
    security([]),
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Token issued", body = AuthResponse),
        (status = 400, description = "Malformed request", body = ErrorBody),
        (status = 401, description = "Wrong password", body = ErrorBody)
    )
)]
#[post("/api/auth")]
pub async fn authenticate(
    state: web::Data<HttpState>,
    body: web::Json<AuthRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let AuthRequest { username, password } = body.into_inner();
    if username.is_empty() || password.is_empty() {
        return Err(Error::invalid_request("username and password are required"));
    }

    let token = state
        .auth
        .issue_token(Credentials { username, password })
        .await?;

    Ok(web::Json(AuthResponse { token }))
}

/// The authenticated caller, extracted from the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub UserId);

fn extract_user(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state not configured"))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("authorization header missing"))?;

    let token = header_value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| Error::unauthorized("invalid authorization header format"))?;

    if token.is_empty() {
        return Err(Error::unauthorized("token is empty"));
    }

    state.auth.parse_token(token).map(AuthenticatedUser)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_user(req))
    }
}
