// src/watch/mod.rs
//! The dedup-and-notify pass.
//!
//! Per item: seen-check, keyword gate, report, persist, notify. Persisting
//! before notifying keeps notification at-most-once: a crash between the two
//! loses a message but never repeats one.

pub mod summary;

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::error::WatchError;
use crate::matcher::KeywordSet;
use crate::notify::{format_match_message, NotifyChannel};
use crate::source::SourceReader;
use crate::store::SeenStore;
use crate::types::{Item, SeenRecord};

pub use summary::{MatchReport, RunSummary};

/// One-time metrics registration (so series show up in the exposition).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("watch_items_fetched_total", "Items listed by the source.");
        describe_counter!(
            "watch_items_seen_total",
            "Items skipped because the seen-set already had them."
        );
        describe_counter!("watch_matches_total", "New items that passed the keyword gate.");
        describe_counter!("watch_recorded_total", "Matches persisted to the seen-set.");
        describe_counter!("watch_source_errors_total", "Collection listings that failed.");
        describe_counter!("watch_store_errors_total", "Seen-set lookups or inserts that failed.");
        describe_counter!(
            "watch_notify_failures_total",
            "Notifications rejected or not delivered."
        );
        describe_histogram!("watch_fetch_ms", "Collection listing time in milliseconds.");
        describe_gauge!("watch_last_run_ts", "Unix ts when the last pass finished.");
    });
}

/// Orchestrator with its collaborators injected.
pub struct Watcher {
    source: Arc<dyn SourceReader>,
    store: Arc<dyn SeenStore>,
    notify: NotifyChannel,
    fetch_limit: usize,
}

impl Watcher {
    pub fn new(
        source: Arc<dyn SourceReader>,
        store: Arc<dyn SeenStore>,
        notify: NotifyChannel,
        fetch_limit: usize,
    ) -> Self {
        Self {
            source,
            store,
            notify,
            fetch_limit: fetch_limit.max(1),
        }
    }

    /// Poll every collection once, in order. Never fails: source, store and
    /// notifier errors are logged and counted in the summary.
    pub async fn run_once(&self, collections: &[String], keywords: &KeywordSet) -> RunSummary {
        ensure_metrics_described();
        info!(?collections, keywords = ?keywords.as_slice(), "checking collections");

        let mut summary = RunSummary {
            collections: collections.len(),
            ..RunSummary::default()
        };

        for collection in collections {
            let t0 = Instant::now();
            let items = match self.source.list_recent(collection, self.fetch_limit).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(collection = %collection, source = self.source.name(), error = %e, "fetch failed, skipping collection");
                    counter!("watch_source_errors_total").increment(1);
                    summary.source_errors += 1;
                    summary.failed_collections.push(collection.clone());
                    continue;
                }
            };
            histogram!("watch_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
            counter!("watch_items_fetched_total").increment(items.len() as u64);
            summary.fetched += items.len();
            debug!(collection = %collection, count = items.len(), "items fetched");

            for item in &items {
                self.process_item(item, keywords, &mut summary).await;
            }
        }

        let now = chrono::Utc::now().timestamp().max(0);
        gauge!("watch_last_run_ts").set(now as f64);
        info!(
            new_matches = summary.new_matches,
            fetched = summary.fetched,
            source_errors = summary.source_errors,
            store_errors = summary.store_errors,
            notify_failures = summary.notify_failures,
            "pass finished"
        );
        summary
    }

    async fn process_item(&self, item: &Item, keywords: &KeywordSet, summary: &mut RunSummary) {
        match self.store.exists(&item.id).await {
            Ok(true) => {
                counter!("watch_items_seen_total").increment(1);
                summary.already_seen += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                // Not marked seen, so the next run re-evaluates it.
                warn!(id = %item.id, error = %e, "seen-set lookup failed, skipping item");
                counter!("watch_store_errors_total").increment(1);
                summary.store_errors += 1;
                return;
            }
        }

        let Some(keyword) = keywords.first_match(item) else {
            return;
        };
        counter!("watch_matches_total").increment(1);
        summary.matched += 1;

        info!(
            id = %item.id,
            collection = %item.collection_name,
            keyword,
            "\n{}",
            MatchReport { item, keyword }
        );

        match self.store.insert(SeenRecord::from(item)).await {
            Ok(()) => {
                counter!("watch_recorded_total").increment(1);
            }
            Err(WatchError::DuplicateKey(id)) => {
                // Another writer got there first; it owns the notification.
                error!(id = %id, "item recorded between lookup and insert, not notifying");
                summary.already_seen += 1;
                return;
            }
            Err(e) => {
                warn!(id = %item.id, error = %e, "could not record match, will retry next run");
                counter!("watch_store_errors_total").increment(1);
                summary.store_errors += 1;
                return;
            }
        }

        let delivery = self.notify.notify(&format_match_message(item)).await;
        if delivery.is_failure() {
            counter!("watch_notify_failures_total").increment(1);
            summary.notify_failures += 1;
        }
        summary.new_matches += 1;
    }
}
