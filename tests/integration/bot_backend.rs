//! The bot's round trip to the advisory backend.

use secrecy::Secret;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agri_advisory::bot::telegram::TelegramClient;
use agri_advisory::bot::{AdvisoryBot, BackendClient, FETCH_FAILED, USAGE, WELCOME};

fn bot(backend_url: String) -> AdvisoryBot {
    let telegram = TelegramClient::new(
        Secret::new("0:test".into()),
        Some("http://127.0.0.1:9".into()),
        Duration::from_secs(1),
    )
    .unwrap();
    AdvisoryBot::new(telegram, BackendClient::new(backend_url).unwrap(), 1)
}

#[tokio::test]
async fn weather_command_renders_advisory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("city", "Gadag"))
        .and(query_param("crop", "tomato"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": "Gadag",
            "crop": "tomato",
            "temperature": 24.0,
            "humidity": 88.0,
            "condition": "Mist",
            "advisory": "🦠 Risk of fungal infection. Monitor leaves closely.",
            "error": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let bot = bot(format!("{}/weather", server.uri()));
    let (text, markdown) = bot.respond("/weather Gadag tomato").await.unwrap();
    assert!(markdown);
    assert!(text.contains("*Crop:* Tomato"));
    assert!(text.contains("*Humidity:* 88%"));
    assert!(text.contains("*Temperature:* 24.0°C"));
    assert!(text.ends_with("*Advisory:* 🦠 Risk of fungal infection. Monitor leaves closely."));
}

#[tokio::test]
async fn backend_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": "Location not found: Atlantis"
        })))
        .mount(&server)
        .await;

    let bot = bot(format!("{}/weather", server.uri()));
    let (text, _) = bot.respond("/weather Atlantis paddy").await.unwrap();
    assert_eq!(text, "⚠️ Error: Location not found: Atlantis");
}

#[tokio::test]
async fn unreachable_backend() {
    let bot = bot("http://127.0.0.1:9/weather".into());
    let (text, _) = bot.respond("/weather Gadag cotton").await.unwrap();
    assert_eq!(text, FETCH_FAILED);
}

#[tokio::test]
async fn start_usage_and_chatter() {
    let bot = bot("http://127.0.0.1:9/weather".into());
    assert_eq!(bot.respond("/start").await.unwrap().0, WELCOME);
    assert_eq!(bot.respond("/weather Gadag").await.unwrap().0, USAGE);
    assert!(bot.respond("good morning").await.is_none());
}
