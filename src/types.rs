// src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PERMALINK_HOST: &str = "https://reddit.com";

/// A thread fetched from a collection. Never mutated after the source builds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub body: Option<String>,
    pub url: String,
    /// Site-relative path, e.g. `/r/techno/comments/abc123/...`
    pub permalink: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub collection_name: String,
}

impl Item {
    /// Absolute link to the discussion page.
    pub fn permalink_url(&self) -> String {
        if self.permalink.starts_with('/') {
            format!("{PERMALINK_HOST}{}", self.permalink)
        } else {
            self.permalink.clone()
        }
    }

    pub fn author_or_unknown(&self) -> &str {
        self.author.as_deref().unwrap_or("[unknown]")
    }
}

/// Durable proof that an item was matched and reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeenRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    pub permalink: String,
    pub collection_name: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Item> for SeenRecord {
    fn from(it: &Item) -> Self {
        Self {
            id: it.id.clone(),
            title: it.title.clone(),
            url: it.url.clone(),
            permalink: it.permalink.clone(),
            collection_name: it.collection_name.clone(),
            author: it.author.clone(),
            created_at: it.created_at,
        }
    }
}
