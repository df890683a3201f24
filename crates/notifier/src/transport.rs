//! Fire-and-forget webhook delivery.
//!
//! `post_async` returns as soon as the message is handed off. Delivery runs on
//! a background task; its outcome is only visible in the logs, correlated by a
//! per-message delivery id.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use uuid::Uuid;

use kb_slack_common::types::WebhookMessage;

/// Upper bound for one webhook POST, including connect.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

pub trait Transport: Send + Sync {
    /// Submit `message` for delivery to `url` without waiting for the result.
    fn post_async(&self, url: &str, message: WebhookMessage);
}

/// Posts JSON with `reqwest` on a spawned Tokio task.
///
/// Must be used from within a Tokio runtime.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .user_agent(concat!("kb-slack/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn post_async(&self, url: &str, message: WebhookMessage) {
        let client = self.client.clone();
        let url = url.to_string();
        let delivery_id = Uuid::new_v4();
        // Webhook URLs embed credentials; only the host goes into logs.
        let host = webhook_host(&url);

        tracing::info!(
            delivery_id = %delivery_id,
            host = %host,
            has_channel = message.channel.is_some(),
            "Webhook message submitted"
        );

        tokio::spawn(async move {
            match client.post(&url).json(&message).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(delivery_id = %delivery_id, "Webhook message delivered");
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    tracing::warn!(
                        delivery_id = %delivery_id,
                        host = %host,
                        status,
                        body = %body,
                        "Webhook rejected message"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        delivery_id = %delivery_id,
                        host = %host,
                        error = %e,
                        "Webhook delivery failed"
                    );
                }
            }
        });
    }
}

fn webhook_host(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "invalid-url".to_string())
}

/// A message captured by [`RecordingTransport`], as it would appear on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub url: String,
    pub body: serde_json::Value,
}

/// In-memory transport that records submissions instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Transport for RecordingTransport {
    fn post_async(&self, url: &str, message: WebhookMessage) {
        let body = serde_json::to_value(&message).unwrap_or_default();
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(SentMessage {
                url: url.to_string(),
                body,
            });
    }
}
