//! Sends one test message to the configured webhook and reports the outcome.
//! Only SLACK_WEBHOOK_URL (or `[notify]` in watch.toml) is needed.

use thread_watch::config::{load_file_default, ENV_WEBHOOK_URL};
use thread_watch::notify::{Delivery, NotifyChannel, SlackNotifier, DEFAULT_TIMEOUT_SECS};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let file = load_file_default(None)?;
    let url = std::env::var(ENV_WEBHOOK_URL)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or(file.notify.webhook_url);
    let Some(url) = url else {
        anyhow::bail!("{ENV_WEBHOOK_URL} is not set");
    };
    let timeout = file.notify.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

    let channel = NotifyChannel::new(std::sync::Arc::new(
        SlackNotifier::new(url).with_timeout(timeout),
    ));
    let outcome = channel
        .notify("*thread-watch:* webhook check, no action needed")
        .await;

    println!("notify-check: {outcome:?}");
    match outcome {
        Delivery::Delivered => Ok(()),
        other => anyhow::bail!("webhook did not accept the message: {other:?}"),
    }
}
