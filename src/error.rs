// src/error.rs

//! Error kinds shared by the source, store and notifier boundaries.

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatchError>;

#[derive(Error, Debug)]
pub enum WatchError {
    /// Listing a collection failed (network, auth, bad payload).
    #[error("source unavailable for r/{collection}: {message}")]
    SourceUnavailable { collection: String, message: String },

    /// Store lookup or insert could not reach the backend.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Insert of an id that is already recorded.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Webhook post failed before a response came back.
    #[error("notification failure: {0}")]
    NotificationFailure(String),

    /// Missing or invalid configuration; fatal before polling starts.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl WatchError {
    pub fn source_unavailable(collection: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::SourceUnavailable {
            collection: collection.into(),
            message: message.to_string(),
        }
    }

    pub fn store_unavailable(message: impl fmt::Display) -> Self {
        Self::StoreUnavailable(message.to_string())
    }

    pub fn notification(message: impl fmt::Display) -> Self {
        Self::NotificationFailure(message.to_string())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Short label used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "source_unavailable",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::NotificationFailure(_) => "notification_failure",
            Self::Configuration(_) => "configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_names_the_collection() {
        let e = WatchError::source_unavailable("techno", "HTTP 503");
        assert_eq!(e.to_string(), "source unavailable for r/techno: HTTP 503");
        assert_eq!(e.kind(), "source_unavailable");
    }
}
