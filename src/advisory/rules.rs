//! Hand-written crop advisory table.
//!
//! Checks run top to bottom per crop; the first matching threshold wins.
//! All comparisons are strict.

use super::AdvisoryEngine;
use crate::types::{AdvisoryInput, Crop};

pub const COTTON_HIGH_HUMIDITY: &str =
    "🛑 Avoid pesticide spraying today due to high humidity. Risk of wash-off.";
pub const COTTON_VERY_HOT: &str =
    "🔥 Very hot. Irrigate cotton fields early morning or late evening.";
pub const COTTON_OK: &str = "✅ Suitable weather for cotton. Monitor pest activity.";

pub const PADDY_RAIN: &str = "🌧️ Rain expected. Delay nitrogen fertilizer application.";
pub const PADDY_HIGH_HUMIDITY: &str = "💧 High humidity. Monitor for blast disease in paddy.";
pub const PADDY_OK: &str = "✅ Good weather for paddy growth.";

pub const TOMATO_COLD: &str = "❄️ Low temperature may affect fruiting. Protect young plants.";
pub const TOMATO_FUNGAL: &str = "🦠 Risk of fungal infection. Monitor leaves closely.";
pub const TOMATO_OK: &str = "✅ Favorable for tomato farming.";

pub const GENERAL: &str =
    "✅ General advisory: Weather looks normal. Proceed with usual farm tasks.";

const COTTON_HUMIDITY_LIMIT: f64 = 80.0;
const COTTON_HEAT_LIMIT: f64 = 35.0;
const PADDY_HUMIDITY_LIMIT: f64 = 85.0;
const TOMATO_COLD_LIMIT: f64 = 20.0;
const TOMATO_HUMIDITY_LIMIT: f64 = 85.0;

/// Look up the advisory for an input.
pub fn crop_advisory(input: &AdvisoryInput) -> &'static str {
    let temp = input.temperature_c;
    let humidity = input.humidity_pct;

    match input.crop {
        Crop::Cotton => {
            if humidity > COTTON_HUMIDITY_LIMIT {
                COTTON_HIGH_HUMIDITY
            } else if temp > COTTON_HEAT_LIMIT {
                COTTON_VERY_HOT
            } else {
                COTTON_OK
            }
        }
        Crop::Paddy => {
            if input.condition.to_lowercase().contains("rain") {
                PADDY_RAIN
            } else if humidity > PADDY_HUMIDITY_LIMIT {
                PADDY_HIGH_HUMIDITY
            } else {
                PADDY_OK
            }
        }
        Crop::Tomato => {
            if temp < TOMATO_COLD_LIMIT {
                TOMATO_COLD
            } else if humidity > TOMATO_HUMIDITY_LIMIT {
                TOMATO_FUNGAL
            } else {
                TOMATO_OK
            }
        }
        Crop::Other(_) => GENERAL,
    }
}

/// Stateless engine over [`crop_advisory`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl AdvisoryEngine for RuleEngine {
    fn advise(&self, input: &AdvisoryInput) -> String {
        crop_advisory(input).to_string()
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}
