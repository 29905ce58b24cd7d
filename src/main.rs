//! thread-watch: single-pass entry point.
//! Loads configuration, wires source/store/notifier, runs one pass and prints
//! the summary. Re-run it from cron or a systemd timer for continuous watching.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use thread_watch::{build_watcher, metrics::Metrics, telemetry, WatchConfig};

/// Watch subreddits for new threads mentioning configured keywords.
#[derive(Parser, Debug)]
#[command(name = "thread-watch", version, about)]
struct Cli {
    /// Path to watch.toml (default: $WATCH_CONFIG_PATH, then config/watch.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Write Prometheus metrics for this pass to the given file
    #[arg(long)]
    metrics_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; missing file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose, cli.json_logs);

    let metrics = match &cli.metrics_file {
        Some(_) => Some(Metrics::init()?),
        None => None,
    };

    // Configuration problems are the only fatal errors.
    let cfg = WatchConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let watcher = build_watcher(&cfg).await.context("initializing collaborators")?;

    let summary = watcher.run_once(&cfg.collections, &cfg.keywords).await;

    if let (Some(m), Some(path)) = (&metrics, &cli.metrics_file) {
        if let Err(e) = m.write_to(path) {
            tracing::warn!(error = %format!("{e:#}"), "could not write metrics file");
        }
    }

    if summary.had_errors() {
        tracing::warn!(
            failed_collections = ?summary.failed_collections,
            "pass finished with errors, see log above"
        );
    }
    println!("{summary}");
    Ok(())
}
