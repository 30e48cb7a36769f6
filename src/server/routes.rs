//! Advisory API route handlers.
//!
//! State is shared via `Arc<ServiceState>`; both members are immutable
//! after start-up, so handlers never lock.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::advisory::AdvisoryEngine;
use crate::types::{AdvisoryInput, Crop, Location, Season, SoilType, WeatherError};
use crate::weather::WeatherProvider;

pub const LIVE_MESSAGE: &str = "✅ Agri-Weather Advisory Backend is Live";
pub const MISSING_CITY: &str = "Missing ?city= parameter";

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServiceState {
    pub weather: Box<dyn WeatherProvider>,
    pub engine: Box<dyn AdvisoryEngine>,
}

impl ServiceState {
    pub fn new(weather: Box<dyn WeatherProvider>, engine: Box<dyn AdvisoryEngine>) -> Self {
        Self { weather, engine }
    }
}

pub type AppState = Arc<ServiceState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Raw query string. Everything is optional text so validation errors come
/// back as JSON instead of axum's plain-text rejection. Query strings that
/// fail to deserialize at all (a repeated key, or `soil` together with
/// `soil_type`) are mapped onto `ApiError::InvalidParameter`.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub crop: Option<String>,
    pub season: Option<String>,
    #[serde(alias = "soil_type")]
    pub soil: Option<String>,
}

/// Validated request.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryRequest {
    pub location: Location,
    /// Lower-cased crop text as supplied (may be empty).
    pub crop_text: String,
    pub crop: Crop,
    pub season: Option<Season>,
    pub soil_type: Option<SoilType>,
}

impl WeatherQuery {
    pub fn validate(self) -> Result<AdvisoryRequest, ApiError> {
        let city = self.city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        let lat = non_empty(self.lat);
        let lon = non_empty(self.lon);

        let location = match (city, lat, lon) {
            (Some(city), _, _) => Location::City(city),
            (None, Some(lat), Some(lon)) => {
                let lat = parse_coordinate("lat", &lat)?;
                let lon = parse_coordinate("lon", &lon)?;
                Location::coordinates(lat, lon)
                    .map_err(|e| ApiError::InvalidParameter(e.to_string()))?
            }
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err(ApiError::InvalidParameter(
                    "Both ?lat= and ?lon= are required".to_string(),
                ))
            }
            (None, None, None) => return Err(ApiError::MissingParameter(MISSING_CITY)),
        };

        let crop_text = self.crop.unwrap_or_default().trim().to_lowercase();
        let season = non_empty(self.season)
            .map(|s| s.parse::<Season>())
            .transpose()
            .map_err(ApiError::InvalidParameter)?;
        let soil_type = non_empty(self.soil)
            .map(|s| s.parse::<SoilType>())
            .transpose()
            .map_err(ApiError::InvalidParameter)?;

        Ok(AdvisoryRequest {
            location,
            crop: Crop::from_input(&crop_text),
            crop_text,
            season,
            soil_type,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_coordinate(name: &str, raw: &str) -> Result<f64, ApiError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ApiError::InvalidParameter(format!("Invalid ?{name}= value '{raw}'")))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvisoryResponse {
    /// The requested city, or the resolved name for coordinate lookups.
    pub city: String,
    /// Where the provider resolved the location.
    pub location: String,
    pub crop: String,
    pub season: Option<Season>,
    pub soil_type: Option<SoilType>,
    pub temperature: f64,
    pub humidity: f64,
    pub condition: String,
    pub rainfall: f64,
    pub observed_at: String,
    pub advisory: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub weather_provider: &'static str,
    pub advisory_engine: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything a request can fail with, mapped onto an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingParameter(&'static str),

    #[error("{0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter(_) | ApiError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Weather(e) => match e {
                WeatherError::InvalidCoordinates { .. } => StatusCode::BAD_REQUEST,
                WeatherError::LocationNotFound(_) => StatusCode::NOT_FOUND,
                WeatherError::Upstream { .. } => StatusCode::BAD_GATEWAY,
                WeatherError::Request(_) | WeatherError::Parse(_) | WeatherError::MissingApiKey(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /
pub async fn home() -> &'static str {
    LIVE_MESSAGE
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        weather_provider: state.weather.name(),
        advisory_engine: state.engine.name(),
    })
}

/// GET /weather
pub async fn get_weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<AdvisoryResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidParameter(e.body_text()))?;
    let req = query.validate()?;

    let observation = match state.weather.current(&req.location).await {
        Ok(obs) => obs,
        Err(e) => {
            let err = ApiError::from(e);
            warn!(
                city = %req.location,
                provider = state.weather.name(),
                status = err.status().as_u16(),
                error = %err,
                "Weather lookup failed"
            );
            return Err(err);
        }
    };

    let input = AdvisoryInput::new(req.crop.clone(), req.season, req.soil_type, &observation);
    let advisory = state.engine.advise(&input);

    info!(
        city = %req.location,
        crop = %req.crop,
        status = StatusCode::OK.as_u16(),
        temperature = observation.temperature_c,
        humidity = observation.humidity_pct,
        engine = state.engine.name(),
        "Advisory served"
    );

    let city = match &req.location {
        Location::City(name) => name.clone(),
        Location::Coordinates { .. } => observation.location_name.clone(),
    };

    Ok(Json(AdvisoryResponse {
        city,
        location: observation.location_name,
        crop: req.crop_text,
        season: req.season,
        soil_type: req.soil_type,
        temperature: observation.temperature_c,
        humidity: observation.humidity_pct,
        condition: observation.condition,
        rainfall: observation.rainfall_mm,
        observed_at: observation.observed_at.to_rfc3339(),
        advisory,
        error: None,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
