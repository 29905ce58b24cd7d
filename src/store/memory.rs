// src/store/memory.rs
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, WatchError};
use crate::store::SeenStore;
use crate::types::SeenRecord;

/// Process-local seen-set. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, SeenRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, e.g. to simulate ids recorded by an earlier run.
    pub fn with_records(records: impl IntoIterator<Item = SeenRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: Mutex::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<SeenRecord> {
        self.records.lock().ok()?.get(id).cloned()
    }

    /// All records sorted by id, for comparing store states.
    pub fn snapshot(&self) -> Vec<SeenRecord> {
        let mut v: Vec<SeenRecord> = self
            .records
            .lock()
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();
        v.sort_by(|a, b| a.id.cmp(&b.id));
        v
    }
}

#[async_trait]
impl SeenStore for MemoryStore {
    async fn exists(&self, id: &str) -> Result<bool> {
        let map = self
            .records
            .lock()
            .map_err(|_| WatchError::store_unavailable("memory store mutex poisoned"))?;
        Ok(map.contains_key(id))
    }

    async fn insert(&self, record: SeenRecord) -> Result<()> {
        let mut map = self
            .records
            .lock()
            .map_err(|_| WatchError::store_unavailable("memory store mutex poisoned"))?;
        if map.contains_key(&record.id) {
            return Err(WatchError::DuplicateKey(record.id));
        }
        map.insert(record.id.clone(), record);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
