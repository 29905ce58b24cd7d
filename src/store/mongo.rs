// src/store/mongo.rs
//! MongoDB seen-set. Documents keep the shape older deployments already
//! wrote: `_id`, `title`, `url`, `permalink`, `subreddit`, `author`,
//! `created_utc` (float seconds).

use async_trait::async_trait;
use bson::doc;
use chrono::{DateTime, Utc};
use std::time::Duration;

use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::ClientOptions,
    Client, Collection,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WatchError};
use crate::store::SeenStore;
use crate::types::SeenRecord;

const DUPLICATE_KEY_CODE: i32 = 11000;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SeenDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    url: String,
    permalink: String,
    subreddit: String,
    #[serde(default)]
    author: Option<String>,
    created_utc: f64,
}

impl From<SeenRecord> for SeenDocument {
    fn from(r: SeenRecord) -> Self {
        let created_utc = r.created_at.timestamp_millis() as f64 / 1_000.0;
        Self {
            id: r.id,
            title: r.title,
            url: r.url,
            permalink: r.permalink,
            subreddit: r.collection_name,
            author: r.author,
            created_utc,
        }
    }
}

impl From<SeenDocument> for SeenRecord {
    fn from(d: SeenDocument) -> Self {
        let created_at = DateTime::<Utc>::from_timestamp_millis((d.created_utc * 1_000.0) as i64)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self {
            id: d.id,
            title: d.title,
            url: d.url,
            permalink: d.permalink,
            collection_name: d.subreddit,
            author: d.author,
            created_at,
        }
    }
}

/// Parse the connection string and fill in 5 s selection/connect timeouts
/// unless the string sets its own.
async fn client_options(uri: &str) -> Result<ClientOptions> {
    let mut opts = ClientOptions::parse(uri)
        .await
        .map_err(|e| WatchError::config(format!("invalid MongoDB connection string: {e}")))?;
    opts.server_selection_timeout.get_or_insert(DEFAULT_TIMEOUT);
    opts.connect_timeout.get_or_insert(DEFAULT_TIMEOUT);
    Ok(opts)
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY_CODE
    )
}

#[derive(Clone)]
pub struct MongoSeenStore {
    collection: Collection<SeenDocument>,
}

impl MongoSeenStore {
    /// Build the client. The driver connects lazily, so an unreachable server
    /// surfaces later as `StoreUnavailable` on the first lookup.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let opts = client_options(uri).await?;
        let client = Client::with_options(opts)
            .map_err(|e| WatchError::config(format!("invalid MongoDB client options: {e}")))?;
        info!(database, collection, "MongoDB seen-set configured");
        Ok(Self {
            collection: client.database(database).collection(collection),
        })
    }

    /// Fetch one record, mostly for operators inspecting the store.
    pub async fn get(&self, id: &str) -> Result<Option<SeenRecord>> {
        let found = self
            .collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| WatchError::store_unavailable(format!("find failed: {e}")))?;
        Ok(found.map(SeenRecord::from))
    }
}

#[async_trait]
impl SeenStore for MongoSeenStore {
    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }

    async fn insert(&self, record: SeenRecord) -> Result<()> {
        let id = record.id.clone();
        match self.collection.insert_one(SeenDocument::from(record)).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(WatchError::DuplicateKey(id)),
            Err(e) => Err(WatchError::store_unavailable(format!("insert failed: {e}"))),
        }
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
