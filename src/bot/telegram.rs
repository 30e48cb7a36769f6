//! Telegram Bot API client.
//!
//! Long polling via `getUpdates` and plain `sendMessage`; nothing else
//! of the Bot API is needed.
//!
//! API docs: https://core.telegram.org/bots/api
//! Auth: bot token embedded in the URL path.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://api.telegram.org";

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct TelegramClient {
    http: Client,
    token: Secret<String>,
    base_url: String,
}

impl TelegramClient {
    /// `poll_timeout` is the long-poll window; the HTTP timeout is padded past it.
    pub fn new(token: Secret<String>, base_url: Option<String>, poll_timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()
            .context("Failed to build Telegram HTTP client")?;
        Ok(Self {
            http,
            token,
            base_url: base_url
                .unwrap_or_else(|| BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token.expose_secret())
    }

    /// Fetch updates newer than `offset`, waiting up to `timeout_secs`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let url = format!(
            "{}?offset={offset}&timeout={timeout_secs}&allowed_updates=%5B%22message%22%5D",
            self.method_url("getUpdates")
        );
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Telegram getUpdates request failed")?;
        let envelope: ApiEnvelope<Vec<Update>> = resp
            .json()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to parse Telegram getUpdates response")?;
        let updates = unwrap_envelope(envelope, "getUpdates")?;
        debug!(count = updates.len(), offset, "Telegram updates received");
        Ok(updates)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str, markdown: bool) -> Result<()> {
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: markdown.then_some("Markdown"),
        };
        let resp = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Telegram sendMessage request failed")?;
        let envelope: ApiEnvelope<serde_json::Value> = resp
            .json()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to parse Telegram sendMessage response")?;
        unwrap_envelope(envelope, "sendMessage")?;
        Ok(())
    }
}

fn unwrap_envelope<T>(envelope: ApiEnvelope<T>, method: &str) -> Result<T> {
    if !envelope.ok {
        bail!(
            "Telegram {method} failed: {}",
            envelope.description.unwrap_or_else(|| "unknown error".into())
        );
    }
    envelope
        .result
        .with_context(|| format!("Telegram {method} returned no result"))
}
