//! Nearest-neighbour advisory lookup.
//!
//! The model is fitted offline (`train-advisory`) and saved as a JSON
//! artifact holding the encoder, the encoded training points and their
//! advisory labels. At request time it is read-only.
//!
//! Prediction: Euclidean distance to every stored point, take the `k`
//! nearest (ties broken by dataset order), majority vote over their labels
//! with ties going to the closest point's label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use super::features::{FeatureColumn, FeatureEncoder};
use super::{AdvisoryEngine, MODEL_UNAVAILABLE};
use crate::types::{AdvisoryInput, DatasetRecord, ModelError};

/// Artifact format version.
pub const MODEL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A fitted nearest-neighbour index plus its encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestNeighborModel {
    pub version: u32,
    /// Encoded feature names; must equal `encoder.feature_names()`.
    pub feature_columns: Vec<String>,
    pub encoder: FeatureEncoder,
    pub k: usize,
    pub points: Vec<Vec<f64>>,
    pub labels: Vec<String>,
    pub trained_at: DateTime<Utc>,
}

impl NearestNeighborModel {
    /// Fit on labelled records. `k` of zero is treated as one.
    pub fn fit(
        records: &[DatasetRecord],
        features: &[FeatureColumn],
        k: usize,
    ) -> Result<Self, ModelError> {
        if records.is_empty() {
            return Err(ModelError::Empty);
        }
        let inputs: Vec<AdvisoryInput> = records.iter().map(DatasetRecord::to_input).collect();
        let encoder = FeatureEncoder::fit(features, &inputs)?;
        let points = inputs
            .iter()
            .map(|i| encoder.encode(i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: MODEL_VERSION,
            feature_columns: encoder.feature_names(),
            encoder,
            k: k.max(1),
            points,
            labels: records.iter().map(|r| r.advisory.clone()).collect(),
            trained_at: Utc::now(),
        })
    }

    /// Check the artifact is internally consistent.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.version != MODEL_VERSION {
            return Err(ModelError::Version(self.version));
        }
        let encoder_names = self.encoder.feature_names();
        if self.feature_columns != encoder_names {
            return Err(ModelError::FeatureMismatch {
                model: self.feature_columns.clone(),
                encoder: encoder_names,
            });
        }
        if self.points.is_empty() {
            return Err(ModelError::Empty);
        }
        if self.labels.len() != self.points.len() {
            return Err(ModelError::Dimension {
                expected: self.points.len(),
                actual: self.labels.len(),
            });
        }
        let width = self.encoder.width();
        if let Some(bad) = self.points.iter().find(|p| p.len() != width) {
            return Err(ModelError::Dimension {
                expected: width,
                actual: bad.len(),
            });
        }
        Ok(())
    }

    /// Number of stored training points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Predict the advisory label for one input.
    pub fn predict(&self, input: &AdvisoryInput) -> Result<String, ModelError> {
        if self.points.is_empty() {
            return Err(ModelError::Empty);
        }
        let query = self.encoder.encode(input)?;

        let mut ranked: Vec<(f64, usize)> = self
            .points
            .iter()
            .enumerate()
            .map(|(idx, p)| (squared_distance(&query, p), idx))
            .collect();
        // Stable sort keeps dataset order among equal distances.
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        let neighbours = &ranked[..self.k.clamp(1, ranked.len())];

        let mut votes: HashMap<&str, usize> = HashMap::new();
        for &(_, idx) in neighbours {
            *votes.entry(self.labels[idx].as_str()).or_default() += 1;
        }
        let best = votes.values().copied().max().unwrap_or(0);

        neighbours
            .iter()
            .map(|&(_, idx)| self.labels[idx].as_str())
            .find(|label| votes.get(label).copied() == Some(best))
            .map(str::to_string)
            .ok_or(ModelError::Empty)
    }

    /// Save the artifact as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), points = self.len(), "Model saved");
        Ok(())
    }

    /// Load and validate an artifact. A stored `k` of zero is treated as one.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut model: Self = serde_json::from_str(&json)?;
        model.validate()?;
        if model.k == 0 {
            warn!(path = %path.display(), "Artifact has k = 0, using 1");
            model.k = 1;
        }
        info!(
            path = %path.display(),
            points = model.len(),
            k = model.k,
            features = ?model.feature_columns,
            "Model loaded"
        );
        Ok(model)
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Serves predictions from an optional model; without one, every advisory
/// is [`MODEL_UNAVAILABLE`].
#[derive(Debug, Default)]
pub struct NearestNeighborEngine {
    model: Option<NearestNeighborModel>,
}

impl NearestNeighborEngine {
    pub fn new(model: Option<NearestNeighborModel>) -> Self {
        Self { model }
    }

    /// Load the artifact at `path`, degrading to no model on any error.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match NearestNeighborModel::load(path) {
            Ok(model) => Self::new(Some(model)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Advisory model unavailable");
                Self::new(None)
            }
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }
}

impl AdvisoryEngine for NearestNeighborEngine {
    fn advise(&self, input: &AdvisoryInput) -> String {
        let Some(model) = &self.model else {
            return MODEL_UNAVAILABLE.to_string();
        };
        match model.predict(input) {
            Ok(label) if !label.is_empty() => label,
            Ok(_) => MODEL_UNAVAILABLE.to_string(),
            Err(e) => {
                warn!(error = %e, crop = %input.crop, "Prediction failed");
                MODEL_UNAVAILABLE.to_string()
            }
        }
    }

    fn name(&self) -> &'static str {
        "nearest_neighbor"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
