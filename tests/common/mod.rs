// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use thread_watch::notify::{MessagePayload, Notifier, PostReceipt};
use thread_watch::source::SourceReader;
use thread_watch::{Item, WatchError};

pub fn item(id: &str, collection: &str, title: &str, body: Option<&str>) -> Item {
    Item {
        id: id.to_string(),
        title: title.to_string(),
        body: body.map(str::to_string),
        url: format!("https://example.test/{id}"),
        permalink: format!("/r/{collection}/comments/{id}/"),
        author: Some("raver".to_string()),
        created_at: Utc.with_ymd_and_hms(2025, 1, 4, 12, 0, 0).unwrap(),
        collection_name: collection.to_string(),
    }
}

/// Canned listings per collection; a collection mapped to `None` fails.
#[derive(Default)]
pub struct FakeSource {
    listings: Mutex<HashMap<String, Option<Vec<Item>>>>,
    pub calls: Mutex<Vec<(String, usize)>>,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, collection: &str, items: Vec<Item>) {
        self.listings.lock().insert(collection.to_string(), Some(items));
    }

    pub fn fail(&self, collection: &str) {
        self.listings.lock().insert(collection.to_string(), None);
    }
}

#[async_trait]
impl SourceReader for FakeSource {
    async fn list_recent(&self, collection: &str, limit: usize) -> thread_watch::Result<Vec<Item>> {
        self.calls.lock().push((collection.to_string(), limit));
        match self.listings.lock().get(collection) {
            Some(Some(items)) => Ok(items.iter().take(limit).cloned().collect()),
            Some(None) => Err(WatchError::source_unavailable(collection, "HTTP 503")),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// How the fake endpoint answers.
#[derive(Clone, Copy)]
pub enum Reply {
    Status(u16),
    Unreachable,
}

pub struct RecordingNotifier {
    reply: Reply,
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            messages: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn post(&self, payload: &MessagePayload) -> thread_watch::Result<PostReceipt> {
        self.messages.lock().push(payload.text.clone());
        match self.reply {
            Reply::Status(status) => Ok(PostReceipt {
                status,
                body: String::new(),
            }),
            Reply::Unreachable => Err(WatchError::notification("connection refused")),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
