//! Upstream clients against wiremock.

use secrecy::Secret;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agri_advisory::types::{Location, WeatherError};
use agri_advisory::weather::open_meteo::OpenMeteoClient;
use agri_advisory::weather::weatherapi::WeatherApiClient;
use agri_advisory::weather::WeatherProvider;

fn weatherapi(server: &MockServer) -> WeatherApiClient {
    WeatherApiClient::new(
        Secret::new("secret-key".into()),
        Some(format!("{}/v1", server.uri())),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn open_meteo(server: &MockServer) -> OpenMeteoClient {
    OpenMeteoClient::new(Some(server.uri()), Some(server.uri()), Duration::from_secs(5)).unwrap()
}

mod weatherapi_tests {
    use super::*;

    #[tokio::test]
    async fn current_by_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("key", "secret-key"))
            .and(query_param("q", "Gadag"))
            .and(query_param("aqi", "no"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": {"name": "Gadag", "country": "India"},
                "current": {
                    "temp_c": 31.0,
                    "humidity": 58,
                    "precip_mm": 0.0,
                    "condition": {"text": "Sunny"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let obs = weatherapi(&server).current(&Location::City("Gadag".into())).await.unwrap();
        assert_eq!(obs.location_name, "Gadag, India");
        assert_eq!(obs.temperature_c, 31.0);
        assert_eq!(obs.humidity_pct, 58.0);
        assert_eq!(obs.condition, "Sunny");
    }

    #[tokio::test]
    async fn error_body_passes_message_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"code": 2006, "message": "API key is invalid."}
            })))
            .mount(&server)
            .await;

        let err = weatherapi(&server).current(&Location::City("Gadag".into())).await.unwrap_err();
        assert!(matches!(err, WeatherError::Upstream { .. }));
        assert_eq!(err.to_string(), "API key is invalid.");
    }

    #[tokio::test]
    async fn unknown_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"code": 1006, "message": "No matching location found."}
            })))
            .mount(&server)
            .await;

        let err = weatherapi(&server).current(&Location::City("Nowhere".into())).await.unwrap_err();
        assert!(matches!(err, WeatherError::LocationNotFound(_)));
    }

    #[tokio::test]
    async fn non_json_error_becomes_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let err = weatherapi(&server).current(&Location::City("Gadag".into())).await.unwrap_err();
        assert!(matches!(err, WeatherError::Upstream { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn transport_error_hides_key() {
        // Nothing listens on port 9.
        let client = WeatherApiClient::new(
            Secret::new("secret-key".into()),
            Some("http://127.0.0.1:9/v1".into()),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client.current(&Location::City("Gadag".into())).await.unwrap_err();
        assert!(matches!(err, WeatherError::Request(_)));
        assert!(!err.to_string().contains("secret-key"));
    }
}

mod open_meteo_tests {
    use super::*;

    fn forecast_body() -> serde_json::Value {
        serde_json::json!({
            "current": {
                "time": "2026-10-19T06:00",
                "temperature_2m": 26.4,
                "relative_humidity_2m": 91,
                "precipitation": 2.1,
                "weather_code": 63
            }
        })
    }

    #[tokio::test]
    async fn geocode_then_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Mandya"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"name": "Mandya", "latitude": 12.52, "longitude": 76.9, "country": "India"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "12.52"))
            .and(query_param("longitude", "76.9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(1)
            .mount(&server)
            .await;

        let obs = open_meteo(&server).current(&Location::City("Mandya".into())).await.unwrap();
        assert_eq!(obs.location_name, "Mandya, India");
        assert_eq!(obs.condition, "Moderate rain");
        assert_eq!(obs.humidity_pct, 91.0);
        assert_eq!(obs.rainfall_mm, 2.1);
    }

    #[tokio::test]
    async fn coordinates_skip_geocoding() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let loc = Location::coordinates(12.52, 76.9).unwrap();
        let obs = open_meteo(&server).current(&loc).await.unwrap();
        assert_eq!(obs.location_name, "12.5200,76.9000");
    }

    #[tokio::test]
    async fn no_geocoding_result_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = open_meteo(&server).current(&Location::City("Atlantis".into())).await.unwrap_err();
        assert!(matches!(err, WeatherError::LocationNotFound(ref c) if c == "Atlantis"));
    }

    #[tokio::test]
    async fn forecast_error_reason_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": true,
                "reason": "Latitude must be in range of -90 to 90°."
            })))
            .mount(&server)
            .await;

        let loc = Location::coordinates(10.0, 10.0).unwrap();
        let err = open_meteo(&server).current(&loc).await.unwrap_err();
        assert_eq!(err.to_string(), "Latitude must be in range of -90 to 90°.");
    }
}
