//! Offline training: synthetic dataset, evaluation, and the fit→save job
//! behind the `train-advisory` binary.

pub mod dataset;
pub mod evaluation;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::advisory::nearest::NearestNeighborModel;
use crate::config::TrainingConfig;

use evaluation::ClassificationReport;

/// What a training run produced.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: NearestNeighborModel,
    pub report: ClassificationReport,
    pub train_rows: usize,
    pub validation_rows: usize,
}

/// Generate → save dataset → split → fit → evaluate → save artifact.
pub fn run(cfg: &TrainingConfig, model_path: &Path) -> Result<TrainingOutcome> {
    let records = dataset::generate(cfg.rows, cfg.seed);
    dataset::save(&records, Path::new(&cfg.dataset_path))?;
    info!(rows = records.len(), path = %cfg.dataset_path, "Synthetic dataset saved");

    let (train, validation) =
        evaluation::stratified_split(&records, cfg.validation_fraction, cfg.seed);
    info!(train = train.len(), validation = validation.len(), "Dataset split");

    let model = NearestNeighborModel::fit(&train, &cfg.features, cfg.k)
        .context("Failed to fit nearest-neighbour model")?;
    let report = evaluation::evaluate(&model, &validation)
        .context("Failed to evaluate model on validation split")?;

    model
        .save(model_path)
        .with_context(|| format!("Failed to save model to {}", model_path.display()))?;

    Ok(TrainingOutcome {
        model,
        report,
        train_rows: train.len(),
        validation_rows: validation.len(),
    })
}
