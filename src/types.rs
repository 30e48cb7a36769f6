//! Shared types for the advisory service.
//!
//! These types form the data model used across all modules, so that
//! weather, advisory, server and bot code can depend on them without
//! circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Crop metadata
// ---------------------------------------------------------------------------

/// Crop the advisory is tailored to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Crop {
    Cotton,
    Paddy,
    Tomato,
    /// Anything else (including no crop at all); gets the general advisory.
    Other(String),
}

impl Crop {
    /// The crops with dedicated advisories.
    pub const KNOWN: [Crop; 3] = [Crop::Cotton, Crop::Paddy, Crop::Tomato];

    /// Parse free-form user input. Never fails: unknown input is `Other`.
    pub fn from_input(raw: &str) -> Self {
        let normalised = raw.trim().to_lowercase();
        match normalised.as_str() {
            "cotton" => Crop::Cotton,
            "paddy" => Crop::Paddy,
            "tomato" => Crop::Tomato,
            _ => Crop::Other(normalised),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Crop::Cotton => "cotton",
            Crop::Paddy => "paddy",
            Crop::Tomato => "tomato",
            Crop::Other(name) => name,
        }
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Crop {
    fn from(raw: String) -> Self {
        Crop::from_input(&raw)
    }
}

impl From<Crop> for String {
    fn from(crop: Crop) -> Self {
        crop.as_str().to_string()
    }
}

/// Indian cropping season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Kharif,
    Rabi,
    Zaid,
}

impl Season {
    pub const ALL: [Season; 3] = [Season::Kharif, Season::Rabi, Season::Zaid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "kharif",
            Season::Rabi => "rabi",
            Season::Zaid => "zaid",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Season::ALL
            .into_iter()
            .find(|season| season.as_str() == s)
            .ok_or_else(|| format!("Unknown season '{s}' (expected kharif, rabi or zaid)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Alluvial,
    Black,
    Red,
    Laterite,
    Loamy,
    Sandy,
    Clay,
}

impl SoilType {
    pub const ALL: [SoilType; 7] = [
        SoilType::Alluvial,
        SoilType::Black,
        SoilType::Red,
        SoilType::Laterite,
        SoilType::Loamy,
        SoilType::Sandy,
        SoilType::Clay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Alluvial => "alluvial",
            SoilType::Black => "black",
            SoilType::Red => "red",
            SoilType::Laterite => "laterite",
            SoilType::Loamy => "loamy",
            SoilType::Sandy => "sandy",
            SoilType::Clay => "clay",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        SoilType::ALL
            .into_iter()
            .find(|soil| soil.as_str() == s)
            .ok_or_else(|| format!("Unknown soil type '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Location & observation
// ---------------------------------------------------------------------------

/// Where to look up the weather.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

impl Location {
    /// Coordinates must be within -90..=90 / -180..=180.
    pub fn coordinates(lat: f64, lon: f64) -> Result<Self, WeatherError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(WeatherError::InvalidCoordinates { lat, lon });
        }
        Ok(Location::Coordinates { lat, lon })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::City(name) => f.write_str(name),
            Location::Coordinates { lat, lon } => write!(f, "{lat:.4},{lon:.4}"),
        }
    }
}

/// Current conditions as reported by a weather provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Name the provider resolved the location to.
    pub location_name: String,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub condition: String,
    pub rainfall_mm: f64,
    pub observed_at: DateTime<Utc>,
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.1}°C, {:.0}% humidity, {:.1}mm, {}",
            self.location_name, self.temperature_c, self.humidity_pct, self.rainfall_mm, self.condition,
        )
    }
}

/// Everything an advisory engine gets to look at.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryInput {
    pub crop: Crop,
    pub season: Option<Season>,
    pub soil_type: Option<SoilType>,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub condition: String,
    pub rainfall_mm: f64,
}

impl AdvisoryInput {
    pub fn new(
        crop: Crop,
        season: Option<Season>,
        soil_type: Option<SoilType>,
        observation: &Observation,
    ) -> Self {
        Self {
            crop,
            season,
            soil_type,
            temperature_c: observation.temperature_c,
            humidity_pct: observation.humidity_pct,
            condition: observation.condition.clone(),
            rainfall_mm: observation.rainfall_mm,
        }
    }

    /// Helper to build a test input with sensible defaults.
    #[cfg(test)]
    pub fn sample(crop: Crop, temperature_c: f64, humidity_pct: f64) -> Self {
        Self {
            crop,
            season: None,
            soil_type: None,
            temperature_c,
            humidity_pct,
            condition: "Partly cloudy".to_string(),
            rainfall_mm: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// One labelled row of the (synthetic) crop-weather dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub crop: Crop,
    pub season: Season,
    pub soil_type: SoilType,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub rainfall_mm: f64,
    pub advisory: String,
}

impl DatasetRecord {
    /// The row's features, in the shape the advisory engines consume.
    pub fn to_input(&self) -> AdvisoryInput {
        AdvisoryInput {
            crop: self.crop.clone(),
            season: Some(self.season),
            soil_type: Some(self.soil_type),
            temperature_c: self.temperature_c,
            humidity_pct: self.humidity_pct,
            condition: String::new(),
            rainfall_mm: self.rainfall_mm,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures talking to a weather provider.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather request failed: {0}")]
    Request(String),

    #[error("{message}")]
    Upstream { provider: String, message: String },

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Invalid coordinates ({lat}, {lon}): latitude must be -90 to 90, longitude -180 to 180")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("Failed to parse weather response: {0}")]
    Parse(String),

    #[error("Weather API key not configured (env var {0})")]
    MissingApiKey(String),
}

/// Failures loading, validating or querying a lookup artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model I/O error ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Model format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Feature columns disagree: model has {model:?}, encoder produces {encoder:?}")]
    FeatureMismatch { model: Vec<String>, encoder: Vec<String> },

    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("Cannot fit or query an empty model")]
    Empty,

    #[error("Unsupported model version {0}")]
    Version(u32),

    #[error("Invalid model input: {0}")]
    InvalidInput(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
