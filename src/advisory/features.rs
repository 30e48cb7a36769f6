//! Feature encoding for the nearest-neighbour lookup.
//!
//! Numeric columns are standard-scaled with the training mean and
//! population standard deviation. Categorical columns are one-hot encoded
//! over the categories seen during fitting; unknown or absent values
//! encode as all zeros.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{AdvisoryInput, ModelError};

/// Deviation below which a column is treated as constant.
const MIN_STD: f64 = 1e-12;

/// A raw input column the model may be fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumn {
    TemperatureC,
    HumidityPct,
    RainfallMm,
    Crop,
    Season,
    SoilType,
}

impl FeatureColumn {
    /// Temperature, humidity and crop.
    pub fn default_set() -> Vec<Self> {
        vec![Self::TemperatureC, Self::HumidityPct, Self::Crop]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TemperatureC => "temperature_c",
            Self::HumidityPct => "humidity_pct",
            Self::RainfallMm => "rainfall_mm",
            Self::Crop => "crop",
            Self::Season => "season",
            Self::SoilType => "soil_type",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::TemperatureC | Self::HumidityPct | Self::RainfallMm)
    }

    fn numeric_value(&self, input: &AdvisoryInput) -> f64 {
        match self {
            Self::TemperatureC => input.temperature_c,
            Self::HumidityPct => input.humidity_pct,
            Self::RainfallMm => input.rainfall_mm,
            Self::Crop | Self::Season | Self::SoilType => 0.0,
        }
    }

    fn category_value(&self, input: &AdvisoryInput) -> Option<String> {
        match self {
            Self::Crop => Some(input.crop.as_str().to_string()).filter(|c| !c.is_empty()),
            Self::Season => input.season.map(|s| s.as_str().to_string()),
            Self::SoilType => input.soil_type.map(|s| s.as_str().to_string()),
            Self::TemperatureC | Self::HumidityPct | Self::RainfallMm => None,
        }
    }
}

/// A fitted transformation for one raw column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodedColumn {
    Scaled { column: FeatureColumn, mean: f64, std: f64 },
    OneHot { column: FeatureColumn, categories: Vec<String> },
}

impl EncodedColumn {
    fn width(&self) -> usize {
        match self {
            Self::Scaled { .. } => 1,
            Self::OneHot { categories, .. } => categories.len(),
        }
    }
}

/// Fitted encoder: raw inputs in, fixed-width feature vectors out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    pub columns: Vec<EncodedColumn>,
}

impl FeatureEncoder {
    /// Fit scaler statistics and category lists on training inputs.
    pub fn fit(columns: &[FeatureColumn], inputs: &[AdvisoryInput]) -> Result<Self, ModelError> {
        if inputs.is_empty() || columns.is_empty() {
            return Err(ModelError::Empty);
        }

        let mut seen = BTreeSet::new();
        let mut encoded = Vec::with_capacity(columns.len());
        for &column in columns {
            if !seen.insert(column.name()) {
                return Err(ModelError::InvalidInput(format!(
                    "feature column '{}' listed twice",
                    column.name()
                )));
            }

            if column.is_numeric() {
                let n = inputs.len() as f64;
                let values: Vec<f64> = inputs.iter().map(|i| column.numeric_value(i)).collect();
                let mean = values.iter().sum::<f64>() / n;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                encoded.push(EncodedColumn::Scaled {
                    column,
                    mean,
                    std: if std < MIN_STD { 1.0 } else { std },
                });
            } else {
                let categories: BTreeSet<String> =
                    inputs.iter().filter_map(|i| column.category_value(i)).collect();
                encoded.push(EncodedColumn::OneHot {
                    column,
                    categories: categories.into_iter().collect(),
                });
            }
        }

        Ok(Self { columns: encoded })
    }

    /// Length of every encoded vector.
    pub fn width(&self) -> usize {
        self.columns.iter().map(EncodedColumn::width).sum()
    }

    /// Names of the encoded features, in vector order
    /// (`temperature_c`, `crop=cotton`, ...).
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width());
        for col in &self.columns {
            match col {
                EncodedColumn::Scaled { column, .. } => names.push(column.name().to_string()),
                EncodedColumn::OneHot { column, categories } => {
                    names.extend(categories.iter().map(|c| format!("{}={c}", column.name())));
                }
            }
        }
        names
    }

    /// Encode one input. Fails only on non-finite numeric values.
    pub fn encode(&self, input: &AdvisoryInput) -> Result<Vec<f64>, ModelError> {
        let mut out = Vec::with_capacity(self.width());
        for col in &self.columns {
            match col {
                EncodedColumn::Scaled { column, mean, std } => {
                    let raw = column.numeric_value(input);
                    if !raw.is_finite() {
                        return Err(ModelError::InvalidInput(format!(
                            "{} is not a finite number",
                            column.name()
                        )));
                    }
                    out.push((raw - mean) / std);
                }
                EncodedColumn::OneHot { column, categories } => {
                    let value = column.category_value(input);
                    out.extend(categories.iter().map(|c| {
                        if value.as_deref() == Some(c.as_str()) { 1.0 } else { 0.0 }
                    }));
                }
            }
        }
        Ok(out)
    }
}
