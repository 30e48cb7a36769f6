//! Agri-Weather advisory server.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the weather provider and advisory engine once, and serves the
//! HTTP API until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use agri_advisory::advisory;
use agri_advisory::config::AppConfig;
use agri_advisory::logging;
use agri_advisory::server::{self, routes::ServiceState};
use agri_advisory::weather;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();
    logging::init();

    let config_path = std::env::var("AGRI_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let mut cfg = AppConfig::load_or_default(&config_path)?;
    cfg.apply_env_overrides();

    info!(
        config = %config_path,
        provider = ?cfg.weather.provider,
        engine = ?cfg.advisory.engine,
        port = cfg.server.port,
        "Agri-Weather advisory backend starting up"
    );

    let provider = weather::build_provider(&cfg.weather)?;
    let engine = advisory::build_engine(&cfg.advisory);
    let state = Arc::new(ServiceState::new(provider, engine));

    server::serve(state, &cfg.server.host, cfg.server.port).await
}
