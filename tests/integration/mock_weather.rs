//! Mock weather provider for integration testing.
//!
//! Returns canned observations per city and records every lookup,
//! all in-memory with no external dependencies.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use agri_advisory::types::{Location, Observation, WeatherError};
use agri_advisory::weather::WeatherProvider;

/// A deterministic weather provider.
#[derive(Clone, Default)]
pub struct MockWeather {
    by_city: HashMap<String, Observation>,
    lookups: Arc<Mutex<Vec<Location>>>,
    /// If set, every lookup fails with an upstream error carrying this text.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockWeather {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register canned conditions for a city.
    pub fn with_city(mut self, city: &str, temp: f64, humidity: f64, condition: &str) -> Self {
        self.by_city.insert(
            city.to_lowercase(),
            Observation {
                location_name: format!("{city}, India"),
                temperature_c: temp,
                humidity_pct: humidity,
                condition: condition.to_string(),
                rainfall_mm: 0.0,
                observed_at: Utc::now(),
            },
        );
        self
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn lookups(&self) -> Vec<Location> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for MockWeather {
    async fn current(&self, location: &Location) -> Result<Observation, WeatherError> {
        self.lookups.lock().unwrap().push(location.clone());
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(WeatherError::Upstream {
                provider: "mock".into(),
                message: msg,
            });
        }
        match location {
            Location::City(name) => self
                .by_city
                .get(&name.to_lowercase())
                .cloned()
                .ok_or_else(|| WeatherError::LocationNotFound(name.clone())),
            Location::Coordinates { lat, lon } => Ok(Observation {
                location_name: format!("{lat},{lon}"),
                temperature_c: 25.0,
                humidity_pct: 60.0,
                condition: "Clear sky".into(),
                rainfall_mm: 0.0,
                observed_at: Utc::now(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
