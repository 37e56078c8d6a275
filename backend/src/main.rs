//! Backend entry-point: loads configuration and serves the ledger API.

use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::server::{AppConfig, run};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::load_from_iter(std::env::args_os())
        .map_err(|err| std::io::Error::other(format!("failed to load configuration: {err}")))?;

    run(config).await
}
