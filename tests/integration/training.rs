//! The offline job end to end: dataset → split → fit → artifact → engine.

use std::path::PathBuf;

use agri_advisory::advisory::features::FeatureColumn;
use agri_advisory::advisory::nearest::{NearestNeighborEngine, NearestNeighborModel};
use agri_advisory::advisory::{AdvisoryEngine, MODEL_UNAVAILABLE};
use agri_advisory::config::TrainingConfig;
use agri_advisory::training::{self, dataset};
use agri_advisory::types::{AdvisoryInput, Crop};

fn temp_path(stem: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("agri_{stem}_{}.json", uuid::Uuid::new_v4()));
    p
}

fn input(crop: Crop, temp: f64, humidity: f64) -> AdvisoryInput {
    AdvisoryInput {
        crop,
        season: None,
        soil_type: None,
        temperature_c: temp,
        humidity_pct: humidity,
        condition: String::new(),
        rainfall_mm: 0.0,
    }
}

#[test]
fn training_run_writes_loadable_artifact() {
    let dataset_path = temp_path("dataset");
    let model_path = temp_path("model");
    let cfg = TrainingConfig {
        dataset_path: dataset_path.to_string_lossy().to_string(),
        ..TrainingConfig::default()
    };

    let outcome = training::run(&cfg, &model_path).unwrap();
    assert_eq!(outcome.train_rows + outcome.validation_rows, 300);
    assert!(outcome.report.accuracy > 0.6, "accuracy {}", outcome.report.accuracy);

    assert_eq!(dataset::load(&dataset_path).unwrap().len(), 300);

    let engine = NearestNeighborEngine::from_path(&model_path);
    assert!(engine.has_model());
    // Deep in the "humid cotton" region of the synthetic data.
    assert_eq!(
        engine.advise(&input(Crop::Cotton, 30.0, 97.0)),
        dataset::COTTON_HUMID
    );

    std::fs::remove_file(&dataset_path).unwrap();
    std::fs::remove_file(&model_path).unwrap();
}

#[test]
fn corrupt_artifact_degrades_to_warning() {
    let path = temp_path("corrupt");
    std::fs::write(&path, "{not json").unwrap();
    let engine = NearestNeighborEngine::from_path(&path);
    assert!(!engine.has_model());
    assert_eq!(engine.advise(&input(Crop::Paddy, 25.0, 70.0)), MODEL_UNAVAILABLE);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn extra_features_fit_and_predict() {
    let records = dataset::generate(120, 11);
    let features = vec![
        FeatureColumn::TemperatureC,
        FeatureColumn::HumidityPct,
        FeatureColumn::RainfallMm,
        FeatureColumn::Crop,
        FeatureColumn::Season,
        FeatureColumn::SoilType,
    ];
    let model = NearestNeighborModel::fit(&records, &features, 3).unwrap();
    assert!(model.feature_columns.iter().any(|c| c.starts_with("soil_type=")));
    // Request without season/soil still predicts.
    assert!(model.predict(&input(Crop::Tomato, 19.0, 70.0)).is_ok());
}
