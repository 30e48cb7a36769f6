//! Weather providers.
//!
//! Defines the `WeatherProvider` trait and the two upstream services the
//! advisory endpoint can resolve a location against.

pub mod open_meteo;
pub mod weatherapi;

use anyhow::{Context, Result};
use async_trait::async_trait;
use secrecy::Secret;
use std::time::Duration;
use tracing::info;

use crate::config::{AppConfig, ProviderKind, WeatherConfig};
use crate::types::{Location, Observation, WeatherError};

use open_meteo::OpenMeteoClient;
use weatherapi::WeatherApiClient;

/// User agent sent to every upstream service.
pub(crate) const USER_AGENT: &str = concat!("agri-advisory/", env!("CARGO_PKG_VERSION"));

/// Abstraction over current-conditions weather services.
///
/// Implementors resolve a location (by name or coordinates) and return
/// a single observation. No retries, no caching.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions for a location.
    async fn current(&self, location: &Location) -> Result<Observation, WeatherError>;

    /// Provider name for logging and the health endpoint.
    fn name(&self) -> &'static str;
}

/// Build the provider selected in configuration.
///
/// WeatherAPI.com needs its key at start-up; a missing key is fatal.
pub fn build_provider(cfg: &WeatherConfig) -> Result<Box<dyn WeatherProvider>> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    let provider: Box<dyn WeatherProvider> = match cfg.provider {
        ProviderKind::Weatherapi => {
            let key = AppConfig::resolve_env(&cfg.api_key_env)
                .map_err(|_| WeatherError::MissingApiKey(cfg.api_key_env.clone()))?;
            Box::new(
                WeatherApiClient::new(Secret::new(key), cfg.base_url.clone(), timeout)
                    .context("Failed to build WeatherAPI client")?,
            )
        }
        ProviderKind::OpenMeteo => Box::new(
            OpenMeteoClient::new(cfg.base_url.clone(), cfg.geocoding_url.clone(), timeout)
                .context("Failed to build Open-Meteo client")?,
        ),
    };
    info!(provider = provider.name(), "Weather provider ready");
    Ok(provider)
}

/// Map a transport error without leaking the request URL (it may carry a key).
pub(crate) fn request_error(e: reqwest::Error) -> WeatherError {
    if e.is_decode() {
        WeatherError::Parse(e.without_url().to_string())
    } else {
        WeatherError::Request(e.without_url().to_string())
    }
}
