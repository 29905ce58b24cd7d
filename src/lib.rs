// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod error;
pub mod matcher;
pub mod metrics;
pub mod notify;
pub mod source;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod watch;

use std::sync::Arc;

pub use crate::config::WatchConfig;
pub use crate::error::{Result, WatchError};
pub use crate::matcher::KeywordSet;
pub use crate::types::{Item, SeenRecord};
pub use crate::watch::{RunSummary, Watcher};

use crate::notify::{NotifyChannel, SlackNotifier};
use crate::source::RedditSource;

/// Notification channel described by `cfg`; disabled without a webhook URL.
pub fn notify_channel(cfg: &WatchConfig) -> NotifyChannel {
    match &cfg.notify.webhook_url {
        Some(url) => NotifyChannel::new(Arc::new(
            SlackNotifier::new(url.clone()).with_timeout(cfg.notify.timeout_secs),
        )),
        None => NotifyChannel::disabled(),
    }
}

/// Build the production collaborators (Reddit, configured store, Slack) and
/// wire them into a [`Watcher`].
pub async fn build_watcher(cfg: &WatchConfig) -> Result<Watcher> {
    let source = Arc::new(RedditSource::new(&cfg.source)?);
    let store = store::connect(&cfg.store).await?;
    let notify = notify_channel(cfg);
    if !notify.is_enabled() {
        tracing::info!("SLACK_WEBHOOK_URL not set, matches will only be logged");
    }
    Ok(Watcher::new(source, store, notify, cfg.fetch_limit))
}
