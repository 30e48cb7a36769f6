//! Synthetic crop-weather dataset.
//!
//! Rows are drawn from a seeded RNG and labelled with a fixed rule, so a
//! given `(rows, seed)` always yields the same dataset.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::debug;

use crate::types::{Crop, DatasetRecord, Season, SoilType};

pub const COTTON_HUMID: &str = "🛑 Avoid pesticide spraying (cotton, high humidity).";
pub const COTTON_HEAT: &str = "🔥 Heat stress—irrigate cotton early morning.";
pub const COTTON_NORMAL: &str = "✅ Cotton conditions normal.";
pub const PADDY_BLAST: &str = "💧 High humidity—watch blast disease in paddy.";
pub const PADDY_RAIN: &str = "🌧️ Rain likely—delay nitrogen fertilizer.";
pub const PADDY_NORMAL: &str = "✅ Paddy conditions normal.";
pub const TOMATO_FUNGAL: &str = "🦠 Fungal risk in tomato—ensure ventilation.";
pub const TOMATO_COLD: &str = "❄️ Protect tomato seedlings from cold.";
pub const TOMATO_NORMAL: &str = "✅ Tomato conditions normal.";
pub const GENERAL: &str = "✅ General advisory.";

const TEMP_RANGE: std::ops::Range<f64> = 18.0..42.0;
const HUMIDITY_RANGE: std::ops::Range<u32> = 60..100;
const RAINFALL_RANGE: std::ops::Range<f64> = 0.0..50.0;

/// Label rule for synthetic rows. Humidity is checked before temperature.
pub fn synthetic_label(crop: &Crop, temperature_c: f64, humidity_pct: f64) -> &'static str {
    match crop {
        Crop::Cotton if humidity_pct > 80.0 => COTTON_HUMID,
        Crop::Cotton if temperature_c > 37.0 => COTTON_HEAT,
        Crop::Cotton => COTTON_NORMAL,
        Crop::Paddy if humidity_pct > 88.0 => PADDY_BLAST,
        Crop::Paddy if temperature_c < 25.0 => PADDY_RAIN,
        Crop::Paddy => PADDY_NORMAL,
        Crop::Tomato if humidity_pct > 85.0 => TOMATO_FUNGAL,
        Crop::Tomato if temperature_c < 20.0 => TOMATO_COLD,
        Crop::Tomato => TOMATO_NORMAL,
        Crop::Other(_) => GENERAL,
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Generate `rows` labelled records from `seed`.
pub fn generate(rows: usize, seed: u64) -> Vec<DatasetRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..rows)
        .map(|_| {
            let crop = Crop::KNOWN[rng.random_range(0..Crop::KNOWN.len())].clone();
            let season = Season::ALL[rng.random_range(0..Season::ALL.len())];
            let soil_type = SoilType::ALL[rng.random_range(0..SoilType::ALL.len())];
            let temperature_c = round1(rng.random_range(TEMP_RANGE));
            let humidity_pct = f64::from(rng.random_range(HUMIDITY_RANGE));
            let rainfall_mm = round1(rng.random_range(RAINFALL_RANGE));
            let advisory = synthetic_label(&crop, temperature_c, humidity_pct).to_string();
            DatasetRecord {
                crop,
                season,
                soil_type,
                temperature_c,
                humidity_pct,
                rainfall_mm,
                advisory,
            }
        })
        .collect()
}

/// Write the dataset as a JSON array.
pub fn save(records: &[DatasetRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("Failed to serialise dataset")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write dataset to {}", path.display()))?;
    debug!(path = %path.display(), rows = records.len(), "Dataset written");
    Ok(())
}

/// Read a dataset written by [`save`].
pub fn load(path: &Path) -> Result<Vec<DatasetRecord>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset from {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse dataset from {}", path.display()))
}
