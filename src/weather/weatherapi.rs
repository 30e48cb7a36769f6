//! WeatherAPI.com current-conditions client.
//!
//! Direct city-name lookup: the location string goes straight into `q`.
//! Coordinates are sent as `"lat,lon"`.
//!
//! API: `https://api.weatherapi.com/v1/current.json`
//! Auth: `key` query parameter.
//! Errors: JSON body `{"error": {"code": .., "message": ..}}`, sometimes
//! with a 200 status, so the body is checked before the status.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{request_error, WeatherProvider, USER_AGENT};
use crate::types::{Location, Observation, WeatherError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const BASE_URL: &str = "https://api.weatherapi.com/v1";
const PROVIDER_NAME: &str = "weatherapi";

/// "No matching location found."
const ERROR_CODE_NO_LOCATION: i64 = 1006;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    location: Option<ApiLocation>,
    #[serde(default)]
    current: Option<ApiCurrent>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    name: String,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temp_c: f64,
    humidity: f64,
    condition: ApiCondition,
    #[serde(default)]
    precip_mm: f64,
    #[serde(default)]
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct WeatherApiClient {
    http: Client,
    api_key: Secret<String>,
    base_url: String,
}

impl WeatherApiClient {
    pub fn new(
        api_key: Secret<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(request_error)?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn query_for(location: &Location) -> String {
        match location {
            Location::City(name) => name.clone(),
            Location::Coordinates { lat, lon } => format!("{lat},{lon}"),
        }
    }

    fn build_url(&self, location: &Location) -> String {
        format!(
            "{}/current.json?key={}&q={}&aqi=no",
            self.base_url,
            urlencoding::encode(self.api_key.expose_secret()),
            urlencoding::encode(&Self::query_for(location)),
        )
    }

    /// Turn a response body into an observation, surfacing provider errors.
    fn parse_body(location: &Location, body: &str) -> Result<Observation, WeatherError> {
        let data: CurrentResponse =
            serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        if let Some(err) = data.error {
            if err.code == Some(ERROR_CODE_NO_LOCATION) {
                return Err(WeatherError::LocationNotFound(location.to_string()));
            }
            return Err(WeatherError::Upstream {
                provider: PROVIDER_NAME.to_string(),
                message: err.message,
            });
        }

        let current = data
            .current
            .ok_or_else(|| WeatherError::Parse("response has no `current` block".into()))?;

        let location_name = match data.location {
            Some(ApiLocation { name, country: Some(country) }) if !country.is_empty() => {
                format!("{name}, {country}")
            }
            Some(loc) => loc.name,
            None => location.to_string(),
        };

        let observed_at = current
            .last_updated_epoch
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(Observation {
            location_name,
            temperature_c: current.temp_c,
            humidity_pct: current.humidity,
            condition: current.condition.text,
            rainfall_mm: current.precip_mm,
            observed_at,
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    async fn current(&self, location: &Location) -> Result<Observation, WeatherError> {
        let url = self.build_url(location);
        debug!(%location, "Fetching WeatherAPI current conditions");

        let resp = self.http.get(&url).send().await.map_err(request_error)?;
        let status = resp.status();
        let body = resp.text().await.map_err(request_error)?;

        match Self::parse_body(location, &body) {
            Ok(obs) => Ok(obs),
            // A non-2xx with an unreadable body still deserves the status in the message.
            Err(WeatherError::Parse(_)) if !status.is_success() => {
                warn!(%status, "WeatherAPI returned an error without a JSON body");
                Err(WeatherError::Upstream {
                    provider: PROVIDER_NAME.to_string(),
                    message: format!("WeatherAPI error: {status}"),
                })
            }
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
