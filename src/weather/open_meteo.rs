//! Open-Meteo weather provider.
//!
//! Geocode-then-forecast: city names are resolved through the Open-Meteo
//! geocoding API first, then current conditions are fetched for the
//! coordinates. Coordinates skip the geocoding step.
//!
//! API: `https://api.open-meteo.com/v1/forecast`
//! Geocoding: `https://geocoding-api.open-meteo.com/v1/search`
//! Auth: None required.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{request_error, WeatherProvider, USER_AGENT};
use crate::types::{Location, Observation, WeatherError};

const FORECAST_URL: &str = "https://api.open-meteo.com";
const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";
const PROVIDER_NAME: &str = "open-meteo";

// ---------------------------------------------------------------------------
// Open-Meteo response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: Option<ForecastCurrent>,
}

#[derive(Debug, Deserialize)]
struct ForecastCurrent {
    #[serde(default)]
    time: Option<String>,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    #[serde(default)]
    precipitation: f64,
    #[serde(default)]
    weather_code: Option<i32>,
}

/// `{"error": true, "reason": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    reason: String,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct OpenMeteoClient {
    http: Client,
    forecast_url: String,
    geocoding_url: String,
}

impl OpenMeteoClient {
    pub fn new(
        forecast_url: Option<String>,
        geocoding_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(request_error)?;
        let trim = |url: String| url.trim_end_matches('/').to_string();
        Ok(Self {
            http,
            forecast_url: trim(forecast_url.unwrap_or_else(|| FORECAST_URL.to_string())),
            geocoding_url: trim(geocoding_url.unwrap_or_else(|| GEOCODING_URL.to_string())),
        })
    }

    /// Resolve a city name to coordinates and a display name.
    async fn geocode(&self, city: &str) -> Result<(f64, f64, String), WeatherError> {
        let url = format!(
            "{}/v1/search?name={}&count=1&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(city),
        );
        let resp = self.http.get(&url).send().await.map_err(request_error)?;
        let resp = Self::check_status(resp).await?;
        let data: GeocodingResponse = resp.json().await.map_err(request_error)?;

        let hit = data
            .results
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(city.to_string()))?;
        debug!(city, lat = hit.latitude, lon = hit.longitude, "Geocoded");

        let name = match hit.country {
            Some(country) if !country.is_empty() => format!("{}, {country}", hit.name),
            _ => hit.name,
        };
        Ok((hit.latitude, hit.longitude, name))
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastCurrent, WeatherError> {
        let url = format!(
            "{}/v1/forecast?latitude={lat}&longitude={lon}\
             &current=temperature_2m,relative_humidity_2m,precipitation,weather_code\
             &timezone=GMT",
            self.forecast_url,
        );
        let resp = self.http.get(&url).send().await.map_err(request_error)?;
        let resp = Self::check_status(resp).await?;
        let data: ForecastResponse = resp.json().await.map_err(request_error)?;
        data.current
            .ok_or_else(|| WeatherError::Parse("forecast has no `current` block".into()))
    }

    /// Non-2xx becomes `Upstream`, carrying Open-Meteo's `reason` if present.
    async fn check_status(resp: Response) -> Result<Response, WeatherError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.reason)
            .unwrap_or_else(|_| format!("Open-Meteo API error: {status}"));
        Err(WeatherError::Upstream {
            provider: PROVIDER_NAME.to_string(),
            message,
        })
    }

    fn to_observation(location_name: String, current: ForecastCurrent) -> Observation {
        let observed_at = current
            .time
            .as_deref()
            .and_then(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M").ok())
            .map(|t| t.and_utc())
            .unwrap_or_else(Utc::now);

        Observation {
            location_name,
            temperature_c: current.temperature_2m,
            humidity_pct: current.relative_humidity_2m,
            condition: describe_weather_code(current.weather_code.unwrap_or(-1)).to_string(),
            rainfall_mm: current.precipitation,
            observed_at,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn current(&self, location: &Location) -> Result<Observation, WeatherError> {
        let (lat, lon, name) = match location {
            Location::City(city) => self.geocode(city).await?,
            Location::Coordinates { lat, lon } => (*lat, *lon, location.to_string()),
        };
        let current = self.forecast(lat, lon).await?;
        Ok(Self::to_observation(name, current))
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// WMO weather interpretation code to condition text.
pub fn describe_weather_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 | 57 => "Freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 | 67 => "Freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
