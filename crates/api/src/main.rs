//! Aircraft Maintenance Predictor - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    info!("=== Aircraft Maintenance Predictor v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model artifacts expected in {:?}", config.artifact.dir);

    run_server(config).await
}
