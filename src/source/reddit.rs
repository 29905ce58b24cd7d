// src/source/reddit.rs
//! Read-only Reddit client using application-only OAuth.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::SourceConfig;
use crate::error::{Result, WatchError};
use crate::source::SourceReader;
use crate::types::Item;

/// Reddit refuses listings above this size.
pub const MAX_LISTING_LIMIT: usize = 100;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);
// Refresh a little before the server-side expiry.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: Submission,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Submission {
    id: String,
    title: Option<String>,
    selftext: Option<String>,
    url: Option<String>,
    permalink: String,
    author: Option<String>,
    created_utc: f64,
}

impl Submission {
    fn into_item(self, collection: &str) -> Item {
        let author = self
            .author
            .filter(|a| !a.is_empty() && a != "[deleted]");
        let body = self.selftext.filter(|s| !s.is_empty());
        Item {
            id: self.id,
            title: self.title.unwrap_or_default(),
            body,
            url: self.url.unwrap_or_default(),
            permalink: self.permalink,
            author,
            created_at: unix_to_utc(self.created_utc),
            collection_name: collection.to_string(),
        }
    }
}

fn unix_to_utc(ts: f64) -> DateTime<Utc> {
    if !ts.is_finite() || ts < 0.0 {
        return DateTime::<Utc>::UNIX_EPOCH;
    }
    let secs = ts.trunc() as i64;
    let nanos = (ts.fract() * 1e9) as u32;
    DateTime::from_timestamp(secs, nanos).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

pub struct RedditSource {
    client: Client,
    client_id: String,
    client_secret: String,
    auth_url: String,
    api_base: String,
    token: Mutex<Option<AccessToken>>,
}

impl RedditSource {
    pub fn new(cfg: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| WatchError::config(format!("building reddit http client: {e}")))?;
        Ok(Self {
            client,
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            auth_url: cfg.auth_url.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        })
    }

    async fn bearer(&self, collection: &str) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(tok) = guard.as_ref() {
            if Instant::now() < tok.expires_at {
                return Ok(tok.value.clone());
            }
        }

        tracing::debug!(target: "source", "requesting reddit access token");
        let resp = self
            .client
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| WatchError::source_unavailable(collection, format!("token request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WatchError::source_unavailable(
                collection,
                format!("token request rejected with HTTP {status}"),
            ));
        }
        let tok: TokenResponse = resp
            .json()
            .await
            .map_err(|e| WatchError::source_unavailable(collection, format!("token body: {e}")))?;

        let ttl = Duration::from_secs(tok.expires_in).saturating_sub(TOKEN_SLACK);
        let value = tok.access_token;
        *guard = Some(AccessToken {
            value: value.clone(),
            expires_at: Instant::now() + ttl,
        });
        Ok(value)
    }
}

#[async_trait]
impl SourceReader for RedditSource {
    async fn list_recent(&self, collection: &str, limit: usize) -> Result<Vec<Item>> {
        let token = self.bearer(collection).await?;
        let limit = limit.clamp(1, MAX_LISTING_LIMIT);
        let url = format!("{}/r/{}/new", self.api_base, collection);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&[("limit", limit.to_string()), ("raw_json", "1".to_string())])
            .send()
            .await
            .map_err(|e| WatchError::source_unavailable(collection, e))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            // Force a fresh token on the next call.
            self.token.lock().await.take();
        }
        if !status.is_success() {
            return Err(WatchError::source_unavailable(
                collection,
                format!("listing returned HTTP {status}"),
            ));
        }

        let listing: Listing = resp
            .json()
            .await
            .map_err(|e| WatchError::source_unavailable(collection, format!("listing body: {e}")))?;

        let items: Vec<Item> = listing
            .data
            .children
            .into_iter()
            .filter(|t| t.kind == "t3" && !t.data.id.is_empty())
            .take(limit)
            .map(|t| t.data.into_item(collection))
            .collect();

        tracing::debug!(target: "source", collection, count = items.len(), "listing fetched");
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}
