//! HTTP mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers
//! turn domain failures into the API's `{"errors": "..."}` envelope with
//! consistent status codes.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// JSON error envelope returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable description of the failure.
    pub errors: String,
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        // The public contract returns 400 for unknown users and products,
        // not 404.
        ErrorCode::InvalidRequest | ErrorCode::NotFound | ErrorCode::InsufficientBalance => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::RetriesExceeded => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn client_message(error: &Error) -> String {
    if matches!(error.code(), ErrorCode::InternalError) {
        // Do not leak implementation details to clients.
        "internal server error".to_owned()
    } else {
        error.message().to_owned()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(message = self.message(), "request failed internally");
        }

        HttpResponse::build(self.status_code()).json(ErrorBody {
            errors: client_message(self),
        })
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("internal server error")
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Error::invalid_request("amount must be positive"), StatusCode::BAD_REQUEST)]
    #[case(Error::not_found("user not found"), StatusCode::BAD_REQUEST)]
    #[case(
        Error::insufficient_balance("not enough balance to perform this operation"),
        StatusCode::BAD_REQUEST
    )]
    #[case(Error::unauthorized("invalid token"), StatusCode::UNAUTHORIZED)]
    #[case(Error::retries_exceeded("kept conflicting"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("pool exploded"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn codes_map_to_expected_statuses(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[tokio::test]
    async fn business_errors_surface_their_message() {
        let response = Error::invalid_request("amount must be positive").error_response();
        let body = to_bytes(response.into_body()).await.expect("body bytes");
        let parsed: ErrorBody = serde_json::from_slice(&body).expect("error envelope");
        assert_eq!(parsed.errors, "amount must be positive");
    }

    #[tokio::test]
    async fn internal_errors_are_redacted() {
        let response = Error::internal("password for db is hunter2").error_response();
        let body = to_bytes(response.into_body()).await.expect("body bytes");
        let parsed: ErrorBody = serde_json::from_slice(&body).expect("error envelope");
        assert_eq!(parsed.errors, "internal server error");
    }
}
