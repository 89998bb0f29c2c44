// src/feed/fetch.rs
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;

use crate::feed::error::FeedError;
use crate::feed::types::FeedFetcher;

/// Live fetcher backed by a shared `reqwest::Client`.
pub struct HttpFetcher {
    client: reqwest::Client,
    default_user_agent: String,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, default_user_agent: impl Into<String>) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Fetch {
                url: String::new(),
                reason: format!("building http client: {e}"),
            })?;
        Ok(Self {
            client,
            default_user_agent: default_user_agent.into(),
        })
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, user_agent: Option<&str>) -> Result<Vec<u8>, FeedError> {
        let ua = user_agent.unwrap_or(self.default_user_agent.as_str());
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, ua)
            .send()
            .await
            .map_err(|e| FeedError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|e| FeedError::Fetch {
            url: url.to_string(),
            reason: format!("reading body: {e}"),
        })?;
        Ok(body.to_vec())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// In-memory fetcher: serves fixed bodies by URL. Used by tests and offline runs.
/// Unknown URLs answer 404 unless a fallback body is set.
#[derive(Default)]
pub struct FixtureFetcher {
    bodies: HashMap<String, Vec<u8>>,
    fallback: Option<Vec<u8>>,
    /// user agents seen per URL, in request order
    seen_agents: std::sync::Mutex<Vec<(String, Option<String>)>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    pub fn with_fallback(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.fallback = Some(body.into());
        self
    }

    /// `(url, user_agent)` pairs requested so far.
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        match self.seen_agents.lock() {
            Ok(g) => g.clone(),
            Err(poison) => poison.into_inner().clone(),
        }
    }
}

#[async_trait]
impl FeedFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str, user_agent: Option<&str>) -> Result<Vec<u8>, FeedError> {
        if let Ok(mut seen) = self.seen_agents.lock() {
            seen.push((url.to_string(), user_agent.map(str::to_string)));
        }
        self.bodies
            .get(url)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| FeedError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
