//! OpenAPI documentation assembled from handler annotations.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::{account, auth, health, operations};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::authenticate,
        account::get_info,
        operations::send_coin,
        operations::buy_item,
        health::ready,
        health::live,
    ),
    components(schemas(
        auth::AuthRequest,
        auth::AuthResponse,
        account::InfoResponse,
        account::InventoryEntry,
        account::CoinHistory,
        account::ReceivedEntry,
        account::SentEntry,
        operations::SendCoinRequest,
        crate::inbound::http::ErrorBody,
    )),
    modifiers(&BearerAuth),
    security(("bearerAuth" = []))
)]
pub struct ApiDoc;
