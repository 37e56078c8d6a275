//! Server construction: pools, migrations, service wiring, and routes.

mod config;

pub use config::AppConfig;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::ApiDoc;
use crate::domain::{AuthService, LedgerService};
use crate::inbound::http::account::get_info;
use crate::inbound::http::auth::authenticate;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::operations::{buy_item, send_coin};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{
    DbPool, DieselLedgerStore, DieselProductCatalog, DieselUserRepository, PoolConfig, TxExecutor,
};
use crate::outbound::security::BcryptHasher;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Apply pending migrations against the primary.
fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = diesel::PgConnection::establish(database_url)
        .map_err(|err| std::io::Error::other(format!("failed to connect for migrations: {err}")))?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| std::io::Error::other(format!("failed to run migrations: {err}")))?;

    info!(count = applied.len(), "migrations applied");
    Ok(())
}

/// Build the port implementations and bundle them into HTTP state.
async fn build_state(config: &AppConfig) -> std::io::Result<HttpState> {
    let primary = DbPool::new(
        PoolConfig::new(config.database_url.clone()).with_max_size(config.pool_max_size()),
    )
    .await
    .map_err(std::io::Error::other)?;

    let replica = if config.replica_database_url() == config.database_url {
        primary.clone()
    } else {
        DbPool::new(
            PoolConfig::new(config.replica_database_url()).with_max_size(config.pool_max_size()),
        )
        .await
        .map_err(std::io::Error::other)?
    };

    let tx = TxExecutor::new(primary.clone(), replica.clone());
    let store = Arc::new(DieselLedgerStore::new(tx, config.retry_policy()));
    let catalog = Arc::new(DieselProductCatalog::new(replica));
    let users = Arc::new(DieselUserRepository::new(primary));

    let auth = Arc::new(AuthService::new(
        users,
        Arc::new(BcryptHasher::new()),
        &config.jwt_secret,
        config.jwt_ttl(),
    ));
    let ledger = Arc::new(LedgerService::new(store, catalog));

    Ok(HttpState::new(auth, ledger.clone(), ledger))
}

/// Run migrations, wire the adapters, and serve until shutdown.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let database_url = config.database_url.clone();
    tokio::task::spawn_blocking(move || run_migrations(&database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("migration task panicked: {err}")))??;

    let state = web::Data::new(build_state(&config).await?);
    let health = web::Data::new(HealthState::new());
    let server_health = health.clone();

    let server = HttpServer::new(move || {
        #[cfg_attr(not(debug_assertions), allow(unused_mut, reason = "mutated in debug builds"))]
        let mut app = App::new()
            .app_data(state.clone())
            .app_data(server_health.clone())
            .service(authenticate)
            .service(get_info)
            .service(send_coin)
            .service(buy_item)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        {
            app = app
                .service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
        }

        app
    })
    .bind(config.bind_addr())?;

    info!(addr = config.bind_addr(), "listening");
    health.mark_ready();
    server.run().await
}
