//! End-to-end tests of the advisory API over the mock provider.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use agri_advisory::advisory::features::FeatureColumn;
use agri_advisory::advisory::nearest::{NearestNeighborEngine, NearestNeighborModel};
use agri_advisory::advisory::rules::{self, RuleEngine};
use agri_advisory::advisory::AdvisoryEngine;
use agri_advisory::server::build_router;
use agri_advisory::server::routes::ServiceState;
use agri_advisory::training::dataset;
use agri_advisory::types::Location;

use super::mock_weather::MockWeather;

fn weather() -> MockWeather {
    MockWeather::new()
        .with_city("Gadag", 36.2, 55.0, "Sunny")
        .with_city("Mandya", 27.0, 90.0, "Overcast")
        .with_city("Kolar", 17.5, 70.0, "Mist")
}

fn app(weather: MockWeather, engine: Box<dyn AdvisoryEngine>) -> axum::Router {
    build_router(Arc::new(ServiceState::new(Box::new(weather), engine)))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn rule_table_per_crop() {
    let cases = [
        ("Gadag", "cotton", rules::COTTON_VERY_HOT),
        ("Mandya", "paddy", rules::PADDY_HIGH_HUMIDITY),
        ("Kolar", "tomato", rules::TOMATO_COLD),
        ("Gadag", "", rules::GENERAL),
        ("Gadag", "ragi", rules::GENERAL),
    ];
    for (city, crop, expected) in cases {
        let uri = format!("/weather?city={city}&crop={crop}");
        let (status, json) = get(app(weather(), Box::new(RuleEngine)), &uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(json["advisory"], expected, "{uri}");
        assert_eq!(json["crop"], crop);
        for field in ["temperature", "humidity", "condition"] {
            assert!(!json[field].is_null(), "{field} missing for {uri}");
        }
    }
}

#[tokio::test]
async fn missing_parameters_never_reach_upstream() {
    let w = weather();
    for uri in ["/weather", "/weather?crop=cotton", "/weather?city=", "/weather?lat=1"] {
        let (status, json) = get(app(w.clone(), Box::new(RuleEngine)), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(json["error"].as_str().is_some());
    }
    assert!(w.lookups().is_empty());
}

#[tokio::test]
async fn upstream_error_surfaces_text() {
    let w = weather();
    w.set_error("API key has exceeded calls per month quota.");
    let (status, json) = get(app(w, Box::new(RuleEngine)), "/weather?city=Gadag").await;
    assert!(!status.is_success());
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "API key has exceeded calls per month quota.");
}

#[tokio::test]
async fn unknown_city_is_404() {
    let (status, _) = get(app(weather(), Box::new(RuleEngine)), "/weather?city=Atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn coordinates_reach_provider() {
    let w = weather();
    let (status, json) =
        get(app(w.clone(), Box::new(RuleEngine)), "/weather?lat=15.43&lon=75.63&crop=cotton").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["advisory"], rules::COTTON_OK);
    assert_eq!(w.lookups(), vec![Location::Coordinates { lat: 15.43, lon: 75.63 }]);
}

#[tokio::test]
async fn nearest_neighbor_engine_serves_dataset_labels() {
    let records = dataset::generate(300, 42);
    let model = NearestNeighborModel::fit(&records, &FeatureColumn::default_set(), 1).unwrap();
    let engine = NearestNeighborEngine::new(Some(model));

    let (status, json) = get(app(weather(), Box::new(engine)), "/weather?city=Mandya&crop=cotton").await;
    assert_eq!(status, StatusCode::OK);
    let advisory = json["advisory"].as_str().unwrap();
    let known: Vec<&str> = records.iter().map(|r| r.advisory.as_str()).collect();
    assert!(known.contains(&advisory), "unexpected advisory {advisory}");
}

#[tokio::test]
async fn soil_type_alias_and_clash() {
    let (status, json) = get(
        app(weather(), Box::new(RuleEngine)),
        "/weather?city=Kolar&crop=tomato&season=rabi&soil_type=red",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["soil_type"], "red");
    assert_eq!(json["season"], "rabi");

    let mock = weather();
    let (status, json) = get(
        app(mock.clone(), Box::new(RuleEngine)),
        "/weather?city=Kolar&soil=red&soil_type=black",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert!(mock.lookups().is_empty());
}
