//! Companion chat bot.
//!
//! Polls Telegram for `/start` and `/weather <City> <Crop>` commands,
//! calls the advisory endpoint and renders the JSON reply as Markdown.

pub mod telegram;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

use telegram::{TelegramClient, Update};

pub const WELCOME: &str =
    "👋 Welcome to Agri Weather Bot!\n\nUse `/weather Gadag tomato` to get crop advisory 🌾";
pub const USAGE: &str = "❗ Usage: /weather <City> <Crop>";
pub const FETCH_FAILED: &str = "❌ Failed to fetch advisory.";

/// Back-off after a failed poll.
const POLL_ERROR_DELAY: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Weather { city: String, crop: String },
    /// `/weather` with the wrong number of arguments.
    WeatherUsage,
}

impl Command {
    /// Parse a message. Non-commands and unknown commands yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;
        // `/weather@AgriBot` in group chats
        let name = head.split('@').next().unwrap_or(head).to_lowercase();
        let args: Vec<&str> = parts.collect();

        match name.as_str() {
            "start" => Some(Command::Start),
            "weather" => match args.as_slice() {
                [city, crop] => Some(Command::Weather {
                    city: (*city).to_string(),
                    crop: (*crop).to_string(),
                }),
                _ => Some(Command::WeatherUsage),
            },
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// The subset of the advisory response the bot renders.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AdvisoryReply {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub crop: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub advisory: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Thin client for the advisory endpoint.
pub struct BackendClient {
    http: Client,
    url: String,
}

impl BackendClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build backend HTTP client")?;
        Ok(Self { http, url: url.into() })
    }

    /// Query the advisory endpoint. Error bodies (4xx/5xx) still parse,
    /// carrying the backend's `error` text.
    pub async fn fetch(&self, city: &str, crop: &str) -> Result<AdvisoryReply> {
        let url = format!(
            "{}?city={}&crop={}",
            self.url,
            urlencoding::encode(city),
            urlencoding::encode(crop)
        );
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Advisory backend request failed")?;
        resp.json::<AdvisoryReply>()
            .await
            .context("Failed to parse advisory backend response")
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn capitalize(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render a backend reply; `(text, markdown)`.
pub fn render_reply(reply: &AdvisoryReply) -> (String, bool) {
    if let Some(err) = reply.error.as_deref().filter(|e| !e.is_empty()) {
        return (format!("⚠️ Error: {err}"), false);
    }
    let text = format!(
        "🌾 *Agri Weather Advisory*\n\
         *City:* {}\n\
         *Crop:* {}\n\
         *Condition:* {}\n\
         *Temperature:* {:?}°C\n\
         *Humidity:* {}%\n\n\
         *Advisory:* {}",
        reply.city,
        capitalize(&reply.crop),
        reply.condition,
        reply.temperature,
        reply.humidity,
        reply.advisory,
    );
    (text, true)
}

// ---------------------------------------------------------------------------
// Bot loop
// ---------------------------------------------------------------------------

pub struct AdvisoryBot {
    telegram: TelegramClient,
    backend: BackendClient,
    poll_timeout_secs: u64,
}

impl AdvisoryBot {
    pub fn new(telegram: TelegramClient, backend: BackendClient, poll_timeout_secs: u64) -> Self {
        Self {
            telegram,
            backend,
            poll_timeout_secs,
        }
    }

    /// Work out the reply for one message; `None` means stay silent.
    pub async fn respond(&self, text: &str) -> Option<(String, bool)> {
        match Command::parse(text)? {
            Command::Start => Some((WELCOME.to_string(), false)),
            Command::WeatherUsage => Some((USAGE.to_string(), false)),
            Command::Weather { city, crop } => match self.backend.fetch(&city, &crop).await {
                Ok(reply) => Some(render_reply(&reply)),
                Err(e) => {
                    warn!(city = %city, crop = %crop, error = %e, "Advisory fetch failed");
                    Some((FETCH_FAILED.to_string(), false))
                }
            },
        }
    }

    async fn handle(&self, update: &Update) {
        let Some(msg) = &update.message else { return };
        let Some(text) = msg.text.as_deref() else { return };
        let Some((reply, markdown)) = self.respond(text).await else { return };
        if let Err(e) = self.telegram.send_message(msg.chat.id, &reply, markdown).await {
            error!(chat_id = msg.chat.id, error = %e, "Failed to send reply");
        }
    }

    /// Poll until Ctrl+C.
    pub async fn run(&self) -> Result<()> {
        let mut offset = 0_i64;
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        info!("Advisory bot polling. Press Ctrl+C to stop.");

        loop {
            tokio::select! {
                result = self.telegram.get_updates(offset, self.poll_timeout_secs) => {
                    match result {
                        Ok(updates) => {
                            for update in &updates {
                                offset = offset.max(update.update_id + 1);
                                self.handle(update).await;
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Polling failed, backing off");
                            tokio::time::sleep(POLL_ERROR_DELAY).await;
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received.");
                    break;
                }
            }
        }
        Ok(())
    }
}
