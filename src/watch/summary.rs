// src/watch/summary.rs
use std::fmt;

use serde::Serialize;

use crate::types::Item;

/// Counters for one `run_once` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub collections: usize,
    pub fetched: usize,
    /// Items skipped because the store already had them.
    pub already_seen: usize,
    /// New items that passed the keyword gate.
    pub matched: usize,
    /// Matches persisted; each got exactly one notification attempt.
    pub new_matches: usize,
    pub source_errors: usize,
    pub store_errors: usize,
    pub notify_failures: usize,
    /// Collections whose listing failed this run.
    pub failed_collections: Vec<String>,
}

impl RunSummary {
    pub fn had_errors(&self) -> bool {
        self.source_errors > 0 || self.store_errors > 0 || self.notify_failures > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "collections={} fetched={} seen={} matched={} new={} source_errors={} store_errors={} notify_failures={}",
            self.collections,
            self.fetched,
            self.already_seen,
            self.matched,
            self.new_matches,
            self.source_errors,
            self.store_errors,
            self.notify_failures
        )
    }
}

/// Console block printed for each new match.
pub struct MatchReport<'a> {
    pub item: &'a Item,
    pub keyword: &'a str,
}

impl fmt::Display for MatchReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- MATCH FOUND ---")?;
        writeln!(f, "Subreddit: r/{}", self.item.collection_name)?;
        writeln!(f, "Title: {}", self.item.title)?;
        writeln!(f, "URL: {}", self.item.url)?;
        writeln!(f, "Reddit Link: {}", self.item.permalink_url())?;
        writeln!(f, "Author: {}", self.item.author_or_unknown())?;
        writeln!(f, "Keyword: {}", self.keyword)?;
        write!(f, "-------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn summary_line_is_stable() {
        let s = RunSummary {
            collections: 3,
            fetched: 120,
            already_seen: 4,
            matched: 2,
            new_matches: 2,
            notify_failures: 1,
            ..RunSummary::default()
        };
        assert_eq!(
            s.to_string(),
            "collections=3 fetched=120 seen=4 matched=2 new=2 source_errors=0 store_errors=0 notify_failures=1"
        );
        assert!(s.had_errors());
    }

    #[test]
    fn report_lists_item_fields() {
        let item = Item {
            id: "abc123".into(),
            title: "MNMT live set announced".into(),
            body: None,
            url: "https://example.test/set".into(),
            permalink: "/r/techno/comments/abc123/".into(),
            author: Some("dj_k".into()),
            created_at: Utc::now(),
            collection_name: "techno".into(),
        };
        let out = MatchReport {
            item: &item,
            keyword: "mnmt",
        }
        .to_string();
        assert!(out.contains("Subreddit: r/techno"));
        assert!(out.contains("Reddit Link: https://reddit.com/r/techno/comments/abc123/"));
        assert!(out.contains("Author: dj_k"));
    }
}
