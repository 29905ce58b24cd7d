// src/config/file.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "WATCH_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/watch.toml";

/// On-disk shape of `watch.toml`. Every field is optional; the environment
/// and built-in defaults fill the gaps.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchFile {
    pub collections: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub fetch_limit: Option<usize>,
    pub reddit: RedditSection,
    pub store: StoreSection,
    pub notify: NotifySection,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedditSection {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: Option<String>,
    pub auth_url: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub uri: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifySection {
    pub webhook_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Parse a config file from an explicit path.
pub fn load_file_from(path: &Path) -> Result<WatchFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Locate the config file:
/// 1) explicit path (must exist)
/// 2) $WATCH_CONFIG_PATH (must exist)
/// 3) config/watch.toml, if present
/// 4) otherwise an empty file (defaults + environment only)
pub fn load_file_default(explicit: Option<&Path>) -> Result<WatchFile> {
    if let Some(p) = explicit {
        return load_file_from(p);
    }
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_file_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_p.exists() {
        return load_file_from(&default_p);
    }
    Ok(WatchFile::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn parses_sections() {
        let f: WatchFile = toml::from_str(
            r#"
collections = ["techno"]
keywords = ["MNMT"]
fetch_limit = 25

[store]
uri = "state/seen.json"

[notify]
timeout_secs = 3
"#,
        )
        .unwrap();
        assert_eq!(f.collections.as_deref(), Some(&["techno".to_string()][..]));
        assert_eq!(f.fetch_limit, Some(25));
        assert_eq!(f.store.uri.as_deref(), Some("state/seen.json"));
        assert_eq!(f.notify.timeout_secs, Some(3));
        assert!(f.reddit.client_id.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<WatchFile>("keywordz = [\"x\"]").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);

        // nothing on disk -> empty
        let f = load_file_default(None).unwrap();
        assert!(f.collections.is_none());

        // ./config/watch.toml
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(tmp.path().join(DEFAULT_CONFIG_PATH), r#"collections = ["a"]"#).unwrap();
        let f = load_file_default(None).unwrap();
        assert_eq!(f.collections, Some(vec!["a".to_string()]));

        // env wins over the fallback
        let p_env = tmp.path().join("other.toml");
        fs::write(&p_env, r#"collections = ["b"]"#).unwrap();
        env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
        let f = load_file_default(None).unwrap();
        assert_eq!(f.collections, Some(vec!["b".to_string()]));

        // env pointing nowhere is an error
        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(load_file_default(None).is_err());
        env::remove_var(ENV_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
