// src/store/mod.rs
//! Seen-set storage. The store is the only durable state and the only dedup
//! authority: an id present here is never reported again.

pub mod file;
pub mod memory;
pub mod mongo;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::error::{Result, WatchError};
use crate::types::SeenRecord;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use mongo::MongoSeenStore;

#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Whether `id` has already been recorded.
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Record a match. Fails with `DuplicateKey` if the id is already present.
    async fn insert(&self, record: SeenRecord) -> Result<()>;

    fn backend(&self) -> &'static str;
}

/// Which backend a connection string selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    Mongo(String),
    File(std::path::PathBuf),
    Memory,
}

impl StoreTarget {
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://") {
            Ok(Self::Mongo(uri.to_string()))
        } else if let Some(path) = uri.strip_prefix("file://") {
            if path.is_empty() {
                return Err(WatchError::config("file:// store needs a path"));
            }
            Ok(Self::File(path.into()))
        } else if uri.ends_with(".json") {
            Ok(Self::File(uri.into()))
        } else if uri == "memory:" || uri == "memory" {
            Ok(Self::Memory)
        } else {
            Err(WatchError::config(format!(
                "unsupported store connection string: {uri}"
            )))
        }
    }
}

/// Open the backend named by `cfg.uri`.
pub async fn connect(cfg: &StoreConfig) -> Result<Arc<dyn SeenStore>> {
    let store: Arc<dyn SeenStore> = match StoreTarget::parse(&cfg.uri)? {
        StoreTarget::Mongo(uri) => {
            Arc::new(MongoSeenStore::connect(&uri, &cfg.database, &cfg.collection).await?)
        }
        StoreTarget::File(path) => Arc::new(JsonFileStore::open(path).await?),
        StoreTarget::Memory => {
            tracing::warn!("memory store selected: matches will not survive this run");
            Arc::new(MemoryStore::new())
        }
    };
    tracing::info!(backend = store.backend(), "seen-set store ready");
    Ok(store)
}
