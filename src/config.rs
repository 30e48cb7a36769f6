//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys, bot tokens) are referenced by env-var name in the
//! config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::advisory::features::FeatureColumn;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub weather: WeatherConfig,
    pub advisory: AdvisoryConfig,
    pub training: TrainingConfig,
    pub bot: BotConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Which upstream weather service resolves locations.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// WeatherAPI.com, direct city-name lookup.
    #[default]
    Weatherapi,
    /// Open-Meteo, geocode then forecast.
    OpenMeteo,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeatherConfig {
    pub provider: ProviderKind,
    /// Env var holding the WeatherAPI.com key (unused by Open-Meteo).
    pub api_key_env: String,
    /// Override for the provider's API base URL.
    pub base_url: Option<String>,
    /// Override for the Open-Meteo geocoding base URL.
    pub geocoding_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key_env: "WEATHERAPI_KEY".to_string(),
            base_url: None,
            geocoding_url: None,
            timeout_secs: 15,
        }
    }
}

/// Which advisory engine the service runs.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    #[default]
    Rules,
    NearestNeighbor,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AdvisoryConfig {
    pub engine: EngineKind,
    pub model_path: String,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            model_path: "crop_advisory_model.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrainingConfig {
    pub rows: usize,
    pub seed: u64,
    pub validation_fraction: f64,
    /// Neighbours consulted per prediction.
    pub k: usize,
    pub features: Vec<FeatureColumn>,
    pub dataset_path: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            rows: 300,
            seed: 42,
            validation_fraction: 0.2,
            k: 1,
            features: FeatureColumn::default_set(),
            dataset_path: "crop_weather_dataset.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BotConfig {
    pub token_env: String,
    /// Full URL of the advisory endpoint the bot queries.
    pub backend_url: String,
    pub poll_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            backend_url: "http://localhost:5000/weather".to_string(),
            poll_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            warn!(path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply process-level overrides (`PORT`).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => warn!(value = %port, "Ignoring invalid PORT"),
            }
        }
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
