//! Slack notification support via Incoming Webhooks.

use serde_json::{Value, json};
use tracing::{info, warn};

use super::Notifier;

/// Slack webhook client.
pub struct SlackNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            client: reqwest::Client::new(),
        }
    }

    /// Build a notifier from the configured webhook URL, if any. A missing
    /// or empty URL disables notifications; the caller reports that
    /// condition, it is not fatal.
    pub fn from_config(webhook_url: Option<&str>) -> Option<Self> {
        webhook_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                info!("Slack notifications enabled");
                Self::new(url.to_string())
            })
    }
}

impl Notifier for SlackNotifier {
    /// Post the report as a plain-text webhook payload. Errors are logged
    /// but not propagated.
    async fn notify(&self, text: &str) -> bool {
        let payload = build_text_payload(text);
        match self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) if !resp.status().is_success() => {
                warn!(
                    status = %resp.status(),
                    "Slack webhook returned non-success status"
                );
                false
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to send Slack notification"
                );
                false
            }
            Ok(_) => {
                info!(
                    report_bytes = text.len(),
                    "Slack notification sent"
                );
                true
            }
        }
    }
}

fn build_text_payload(text: &str) -> Value {
    json!({ "text": text })
}
