// src/matcher.rs
//! Keyword gate: case-insensitive substring match over title and body.

use serde::{Deserialize, Serialize};

use crate::types::Item;

/// Ordered, lowercase keywords. Built once from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Trims and lowercases every entry, dropping empties and repeats.
    /// The first occurrence keeps its position.
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = Vec::new();
        for k in raw {
            let k = k.as_ref().trim().to_lowercase();
            if !k.is_empty() && !keywords.contains(&k) {
                keywords.push(k);
            }
        }
        Self { keywords }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }

    /// First keyword contained in the item's title or body.
    pub fn first_match(&self, item: &Item) -> Option<&str> {
        let title = item.title.to_lowercase();
        let body = item.body.as_deref().unwrap_or_default().to_lowercase();
        self.keywords
            .iter()
            .find(|k| title.contains(k.as_str()) || body.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.first_match(item).is_some()
    }
}

impl From<Vec<String>> for KeywordSet {
    fn from(v: Vec<String>) -> Self {
        Self::new(v)
    }
}

impl From<KeywordSet> for Vec<String> {
    fn from(k: KeywordSet) -> Self {
        k.keywords
    }
}
