//! Outbound notifications for scheduled study tasks.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::NotifyError;

/// Delivers a short message to a user.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// # Errors
    ///
    /// Returns `NotifyError` if the message could not be delivered.
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError> {
        tracing::info!(%recipient, %subject, %body, "notification");
        Ok(())
    }
}

/// Posts each notification as JSON to a webhook.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Reads `STUDY_NOTIFY_WEBHOOK`.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let url = env::var("STUDY_NOTIFY_WEBHOOK").ok()?;
        if url.trim().is_empty() {
            return None;
        }
        Some(Self::new(url.trim()))
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    recipient: &'a str,
    subject: &'a str,
    body: &'a str,
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.url.as_str())
            .json(&WebhookPayload {
                recipient,
                subject,
                body,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

/// Webhook when configured, otherwise the log.
#[must_use]
pub fn notifier_from_env() -> std::sync::Arc<dyn Notifier> {
    match WebhookNotifier::from_env() {
        Some(webhook) => std::sync::Arc::new(webhook),
        None => std::sync::Arc::new(LogNotifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        LogNotifier
            .send("Study Reminder", "body", "alice@example.com")
            .await
            .unwrap();
    }

    #[test]
    fn payload_shape() {
        let json = serde_json::to_value(WebhookPayload {
            recipient: "a@b.io",
            subject: "s",
            body: "b",
        })
        .unwrap();
        assert_eq!(json["recipient"], "a@b.io");
        assert_eq!(json["subject"], "s");
        assert_eq!(json["body"], "b");
    }
}
