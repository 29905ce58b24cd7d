// src/notify/mod.rs
pub mod slack;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::types::Item;

pub use slack::{SlackNotifier, DEFAULT_TIMEOUT_SECS};

/// Body posted to the webhook: `{"text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    pub text: String,
}

impl MessagePayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// What came back from the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
    pub status: u16,
    pub body: String,
}

impl PostReceipt {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport to a notification endpoint. `Err` only when no response came back.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post(&self, payload: &MessagePayload) -> Result<PostReceipt>;

    fn name(&self) -> &'static str;
}

/// Outcome of a single best-effort delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// No endpoint configured.
    Disabled,
    Delivered,
    /// Endpoint answered with a non-2xx status.
    Rejected(u16),
    /// Transport error or timeout.
    Failed,
}

impl Delivery {
    pub fn is_failure(&self) -> bool {
        matches!(self, Delivery::Rejected(_) | Delivery::Failed)
    }
}

/// Fire-and-forget front for an optional notifier. Never returns an error;
/// every failure ends up in the log and nothing is retried.
#[derive(Clone, Default)]
pub struct NotifyChannel {
    notifier: Option<Arc<dyn Notifier>>,
}

impl NotifyChannel {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier: Some(notifier),
        }
    }

    pub fn disabled() -> Self {
        Self { notifier: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    pub async fn notify(&self, message: &str) -> Delivery {
        let Some(notifier) = &self.notifier else {
            tracing::debug!("notifications disabled (no webhook configured)");
            return Delivery::Disabled;
        };

        let payload = MessagePayload::new(message);
        match notifier.post(&payload).await {
            Ok(receipt) if receipt.is_success() => {
                tracing::debug!(notifier = notifier.name(), status = receipt.status, "notification sent");
                Delivery::Delivered
            }
            Ok(receipt) => {
                tracing::warn!(
                    notifier = notifier.name(),
                    status = receipt.status,
                    body = %receipt.body,
                    "webhook rejected notification"
                );
                Delivery::Rejected(receipt.status)
            }
            Err(e) => {
                tracing::warn!(notifier = notifier.name(), error = %e, "error sending notification");
                Delivery::Failed
            }
        }
    }
}

/// Slack mrkdwn text for a match.
pub fn format_match_message(item: &Item) -> String {
    format!(
        "*MATCH FOUND!*\n*Subreddit:* r/{}\n*Title:* {}\n*URL:* {}\n<{}|Reddit Link>\n",
        item.collection_name,
        item.title,
        item.url,
        item.permalink_url()
    )
}
