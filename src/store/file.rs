// src/store/file.rs
//! JSON-file seen-set for single-host deployments.
//!
//! The whole set is loaded at open and rewritten on every insert
//! (write to `<file>.tmp`, then rename), so a crash never leaves a
//! half-written file behind.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{Result, WatchError};
use crate::store::SeenStore;
use crate::types::SeenRecord;

#[derive(Debug, Serialize, Deserialize)]
struct SeenFile {
    updated_at: DateTime<Utc>,
    count: usize,
    records: Vec<SeenRecord>,
}

pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, SeenRecord>>,
}

impl JsonFileStore {
    /// Load `path`, or start empty if it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let file: SeenFile = serde_json::from_slice(&bytes).map_err(|e| {
                    WatchError::store_unavailable(format!(
                        "corrupt seen-set {}: {e}",
                        path.display()
                    ))
                })?;
                file.records
                    .into_iter()
                    .map(|r| (r.id.clone(), r))
                    .collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "seen-set file not found, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                return Err(WatchError::store_unavailable(format!(
                    "reading {}: {e}",
                    path.display()
                )))
            }
        };
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    async fn persist(&self, records: &BTreeMap<String, SeenRecord>) -> std::io::Result<()> {
        let file = SeenFile {
            updated_at: Utc::now(),
            count: records.len(),
            records: records.values().cloned().collect(),
        };
        let bytes = serde_json::to_vec_pretty(&file)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let mut out = tokio::fs::File::create(&tmp).await?;
        out.write_all(&bytes).await?;
        out.flush().await?;
        out.sync_all().await?;
        drop(out);

        tokio::fs::rename(&tmp, &self.path).await
    }
}

#[async_trait]
impl SeenStore for JsonFileStore {
    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.records.lock().await.contains_key(id))
    }

    async fn insert(&self, record: SeenRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.id) {
            return Err(WatchError::DuplicateKey(record.id));
        }
        let id = record.id.clone();
        records.insert(id.clone(), record);

        if let Err(e) = self.persist(&records).await {
            // Not durable, so not seen.
            records.remove(&id);
            return Err(WatchError::store_unavailable(format!(
                "writing {}: {e}",
                self.path.display()
            )));
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
