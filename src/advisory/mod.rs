//! Advisory engines.
//!
//! Defines the `AdvisoryEngine` trait and its two implementations:
//! a hand-written threshold table and a nearest-neighbour lookup over a
//! dataset fitted offline.

pub mod features;
pub mod nearest;
pub mod rules;

use tracing::info;

use crate::config::{AdvisoryConfig, EngineKind};
use crate::types::AdvisoryInput;

use nearest::NearestNeighborEngine;
use rules::RuleEngine;

/// Advisory returned when the lookup artifact is missing or a prediction fails.
pub const MODEL_UNAVAILABLE: &str =
    "⚠️ Advisory model unavailable. Follow standard crop practices and check local weather alerts.";

/// Maps an observation plus crop metadata to a short advisory.
///
/// Engines are immutable after construction and never fail outright:
/// every call yields a non-empty string.
pub trait AdvisoryEngine: Send + Sync {
    fn advise(&self, input: &AdvisoryInput) -> String;

    /// Engine name for logging and the health endpoint.
    fn name(&self) -> &'static str;
}

/// Build the engine selected in configuration.
///
/// The nearest-neighbour engine loads its artifact here, once. A missing
/// or invalid artifact is logged and the engine serves `MODEL_UNAVAILABLE`.
pub fn build_engine(cfg: &AdvisoryConfig) -> Box<dyn AdvisoryEngine> {
    let engine: Box<dyn AdvisoryEngine> = match cfg.engine {
        EngineKind::Rules => Box::new(RuleEngine),
        EngineKind::NearestNeighbor => Box::new(NearestNeighborEngine::from_path(&cfg.model_path)),
    };
    info!(engine = engine.name(), "Advisory engine ready");
    engine
}
