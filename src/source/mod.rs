// src/source/mod.rs
pub mod reddit;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Item;

pub use reddit::RedditSource;

/// Lists the most recent items of a named collection, newest first.
///
/// Implementations fail with `WatchError::SourceUnavailable` on any network,
/// auth or decoding problem.
#[async_trait]
pub trait SourceReader: Send + Sync {
    async fn list_recent(&self, collection: &str, limit: usize) -> Result<Vec<Item>>;

    fn name(&self) -> &'static str;
}
