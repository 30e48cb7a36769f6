//! Telegram front-end for the advisory endpoint.

use anyhow::Result;
use secrecy::Secret;
use std::time::Duration;
use tracing::info;

use agri_advisory::bot::telegram::TelegramClient;
use agri_advisory::bot::{AdvisoryBot, BackendClient};
use agri_advisory::config::AppConfig;
use agri_advisory::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    logging::init();

    let config_path = std::env::var("AGRI_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let cfg = AppConfig::load_or_default(&config_path)?;

    let token = AppConfig::resolve_env(&cfg.bot.token_env)?;
    let telegram = TelegramClient::new(
        Secret::new(token),
        None,
        Duration::from_secs(cfg.bot.poll_timeout_secs),
    )?;
    let backend = BackendClient::new(cfg.bot.backend_url.clone())?;

    info!(backend = %cfg.bot.backend_url, "✅ Telegram bot running");
    AdvisoryBot::new(telegram, backend, cfg.bot.poll_timeout_secs)
        .run()
        .await
}
