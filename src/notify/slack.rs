use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{MessagePayload, Notifier, PostReceipt};
use crate::error::{Result, WatchError};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Slack-style incoming webhook (also accepted by Mattermost and friends).
pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            webhook_url: url.into(),
            client: Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Per-request timeout; zero is raised to one second.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs.max(1));
        self
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn post(&self, payload: &MessagePayload) -> Result<PostReceipt> {
        let rsp = self
            .client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| WatchError::notification(format!("slack post: {e}")))?;

        let status = rsp.status().as_u16();
        // Slack explains rejections in the body ("invalid_payload", "no_text", ...).
        let body = rsp.text().await.unwrap_or_default();
        Ok(PostReceipt { status, body })
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
