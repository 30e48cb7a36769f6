//! Offline trainer for the nearest-neighbour advisory lookup.
//!
//! Generates the synthetic crop-weather dataset, fits the lookup on a
//! stratified training split, prints a validation report and writes the
//! artifact the server loads at start-up.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use agri_advisory::config::AppConfig;
use agri_advisory::logging;
use agri_advisory::training;

fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    logging::init();

    let config_path = std::env::var("AGRI_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let cfg = AppConfig::load_or_default(&config_path)?;
    let model_path = Path::new(&cfg.advisory.model_path);

    info!(
        rows = cfg.training.rows,
        seed = cfg.training.seed,
        k = cfg.training.k,
        features = ?cfg.training.features,
        "Training advisory lookup"
    );

    let outcome = training::run(&cfg.training, model_path)?;

    println!("── Validation report ──");
    println!("{}", outcome.report);
    println!(
        "✅ Dataset saved → {} ({} train / {} validation rows)",
        cfg.training.dataset_path, outcome.train_rows, outcome.validation_rows
    );
    println!(
        "✅ Model saved → {} ({} features)",
        model_path.display(),
        outcome.model.feature_columns.len()
    );
    Ok(())
}
