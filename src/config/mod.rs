// src/config/mod.rs
//! Run configuration, resolved once at startup from `watch.toml`, the
//! environment (`.env` included) and built-in defaults, in that order of
//! increasing priority for the environment.

pub mod file;

use std::path::Path;

use crate::error::{Result, WatchError};
use crate::matcher::KeywordSet;
use crate::notify::slack::DEFAULT_TIMEOUT_SECS;
use crate::source::reddit::MAX_LISTING_LIMIT;

pub use file::{load_file_default, load_file_from, WatchFile};

pub const DEFAULT_COLLECTIONS: &[&str] = &["techno", "festivals", "musicfestivals"];
pub const DEFAULT_KEYWORDS: &[&str] = &["mnmt", "monument"];
pub const DEFAULT_FETCH_LIMIT: usize = 50;
pub const DEFAULT_DATABASE: &str = "mnmt_reddit_db";
pub const DEFAULT_STORE_COLLECTION: &str = "processed_submissions";
pub const DEFAULT_AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";

pub const ENV_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const ENV_USER_AGENT: &str = "REDDIT_USER_AGENT";
pub const ENV_STORE_URI: &str = "MONGODB_URI";
pub const ENV_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
pub const ENV_FETCH_LIMIT: &str = "WATCH_FETCH_LIMIT";

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub auth_url: String,
    pub api_base: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// `mongodb://…`, `file://…`, `*.json` or `memory:`
    pub uri: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    /// Absent means notifications are off.
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub collections: Vec<String>,
    pub keywords: KeywordSet,
    pub fetch_limit: usize,
    pub source: SourceConfig,
    pub store: StoreConfig,
    pub notify: NotifyConfig,
}

impl WatchConfig {
    /// Read the config file (see [`load_file_default`]) and resolve it against
    /// the process environment.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let file = load_file_default(explicit)?;
        Ok(Self::resolve(file, |k| std::env::var(k).ok())?)
    }

    /// Merge `file` with values from `lookup` and validate the result.
    pub fn resolve<F>(file: WatchFile, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let pick = |key: &str, from_file: Option<String>| {
            env(key).or_else(|| from_file.filter(|v| !v.trim().is_empty()))
        };

        let collections = normalize_collections(
            file.collections
                .unwrap_or_else(|| DEFAULT_COLLECTIONS.iter().map(|s| s.to_string()).collect()),
        );
        if collections.is_empty() {
            return Err(WatchError::config("no collections configured"));
        }

        let keywords = match file.keywords {
            Some(k) => KeywordSet::new(k),
            None => KeywordSet::new(DEFAULT_KEYWORDS),
        };
        if keywords.is_empty() {
            return Err(WatchError::config("no keywords configured"));
        }

        let fetch_limit = match env(ENV_FETCH_LIMIT) {
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                WatchError::config(format!("{ENV_FETCH_LIMIT} is not a number: {raw}"))
            })?,
            None => file.fetch_limit.unwrap_or(DEFAULT_FETCH_LIMIT),
        };
        if fetch_limit == 0 {
            return Err(WatchError::config("fetch_limit must be at least 1"));
        }
        let fetch_limit = if fetch_limit > MAX_LISTING_LIMIT {
            tracing::warn!(fetch_limit, max = MAX_LISTING_LIMIT, "fetch_limit clamped");
            MAX_LISTING_LIMIT
        } else {
            fetch_limit
        };

        let require = |key: &str, from_file: Option<String>| {
            pick(key, from_file).ok_or_else(|| WatchError::config(format!("{key} is not set")))
        };
        let source = SourceConfig {
            client_id: require(ENV_CLIENT_ID, file.reddit.client_id)?,
            client_secret: require(ENV_CLIENT_SECRET, file.reddit.client_secret)?,
            user_agent: require(ENV_USER_AGENT, file.reddit.user_agent)?,
            auth_url: file
                .reddit
                .auth_url
                .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            api_base: file
                .reddit
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        };

        let store = StoreConfig {
            uri: require(ENV_STORE_URI, file.store.uri)?,
            database: file
                .store
                .database
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            collection: file
                .store
                .collection
                .unwrap_or_else(|| DEFAULT_STORE_COLLECTION.to_string()),
        };

        let notify = NotifyConfig {
            webhook_url: pick(ENV_WEBHOOK_URL, file.notify.webhook_url),
            timeout_secs: file.notify.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1),
        };

        Ok(Self {
            collections,
            keywords,
            fetch_limit,
            source,
            store,
            notify,
        })
    }
}

/// Trim, strip an `r/` prefix, drop empties and repeats (order kept).
fn normalize_collections(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for c in raw {
        let c = c.trim();
        let c = c
            .strip_prefix("/r/")
            .or_else(|| c.strip_prefix("r/"))
            .unwrap_or(c)
            .trim_matches('/');
        if !c.is_empty() && !out.iter().any(|o| o.eq_ignore_ascii_case(c)) {
            out.push(c.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_CLIENT_ID, "id"),
            (ENV_CLIENT_SECRET, "secret"),
            (ENV_USER_AGENT, "thread-watch/0.1 by tester"),
            (ENV_STORE_URI, "mongodb://localhost:27017"),
        ]
    }

    #[test]
    fn defaults_fill_everything_but_secrets() {
        let cfg = WatchConfig::resolve(WatchFile::default(), env_of(&full_env())).unwrap();
        assert_eq!(cfg.collections, vec!["techno", "festivals", "musicfestivals"]);
        assert_eq!(cfg.keywords.as_slice(), &["mnmt".to_string(), "monument".to_string()]);
        assert_eq!(cfg.fetch_limit, 50);
        assert_eq!(cfg.store.database, "mnmt_reddit_db");
        assert_eq!(cfg.store.collection, "processed_submissions");
        assert_eq!(cfg.notify.webhook_url, None);
        assert_eq!(cfg.notify.timeout_secs, 10);
    }

    #[test]
    fn missing_credentials_is_a_configuration_error() {
        let err = WatchConfig::resolve(WatchFile::default(), env_of(&[])).unwrap_err();
        assert!(matches!(err, WatchError::Configuration(ref m) if m.contains(ENV_CLIENT_ID)));

        let mut env = full_env();
        env.retain(|(k, _)| *k != ENV_STORE_URI);
        let err = WatchConfig::resolve(WatchFile::default(), env_of(&env)).unwrap_err();
        assert!(matches!(err, WatchError::Configuration(ref m) if m.contains(ENV_STORE_URI)));
    }

    #[test]
    fn env_overrides_file_and_blank_env_is_ignored() {
        let mut file = WatchFile::default();
        file.notify.webhook_url = Some("https://hooks.example/file".into());
        file.store.uri = Some("state/seen.json".into());

        let mut env = full_env();
        env.retain(|(k, _)| *k != ENV_STORE_URI);
        env.push((ENV_WEBHOOK_URL, "https://hooks.example/env"));
        env.push((ENV_FETCH_LIMIT, "  "));

        let cfg = WatchConfig::resolve(file, env_of(&env)).unwrap();
        assert_eq!(cfg.notify.webhook_url.as_deref(), Some("https://hooks.example/env"));
        assert_eq!(cfg.store.uri, "state/seen.json");
        assert_eq!(cfg.fetch_limit, 50);
    }

    #[test]
    fn collections_and_keywords_are_normalized() {
        let file = WatchFile {
            collections: Some(vec![" r/Techno ".into(), "/r/festivals/".into(), "techno".into()]),
            keywords: Some(vec!["MNMT".into(), " ".into()]),
            fetch_limit: Some(500),
            ..WatchFile::default()
        };
        let cfg = WatchConfig::resolve(file, env_of(&full_env())).unwrap();
        assert_eq!(cfg.collections, vec!["Techno", "festivals"]);
        assert_eq!(cfg.keywords.as_slice(), &["mnmt".to_string()]);
        assert_eq!(cfg.fetch_limit, MAX_LISTING_LIMIT);
    }

    #[test]
    fn empty_lists_and_zero_limit_are_rejected() {
        let empty_kw = WatchFile {
            keywords: Some(vec![]),
            ..WatchFile::default()
        };
        assert!(WatchConfig::resolve(empty_kw, env_of(&full_env())).is_err());

        let empty_cols = WatchFile {
            collections: Some(vec!["  ".into()]),
            ..WatchFile::default()
        };
        assert!(WatchConfig::resolve(empty_cols, env_of(&full_env())).is_err());

        let mut env = full_env();
        env.push((ENV_FETCH_LIMIT, "0"));
        assert!(WatchConfig::resolve(WatchFile::default(), env_of(&env)).is_err());
    }
}
