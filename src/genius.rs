// genius.rs - Genius API Client
// Resolves free-text queries to songs through the Genius search endpoint and
// downloads lyrics pages with browser-like headers.
//
// Used by: pipeline.rs (through the SongSearch / PageSource traits), main.rs

use crate::config::BotConfig;
use crate::error::LyricsError;
use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Song metadata taken from the first search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongResult {
    pub title: String,
    pub artist: String,
    pub url: String,
}

impl SongResult {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            url: url.into(),
        }
    }
}

#[async_trait]
pub trait SongSearch: Send + Sync {
    /// Resolve a query to a song. Failures are logged and reported as `None`.
    async fn search_song(&self, query: &str) -> Option<SongResult>;
}

#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, LyricsError>;
}

// Search response structures: { response: { hits: [ { result: {...} } ] } }
#[derive(Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

// Later hits are kept untyped; only the first one has to look like a song
#[derive(Deserialize)]
struct SearchBody {
    hits: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct SearchHit {
    result: HitResult,
}

#[derive(Deserialize)]
struct HitResult {
    title: String,
    url: String,
    primary_artist: PrimaryArtist,
}

#[derive(Deserialize)]
struct PrimaryArtist {
    name: String,
}

/// Parse a search response body, taking the first hit unconditionally
pub fn parse_search_response(body: &str) -> Result<Option<SongResult>, LyricsError> {
    let parsed: SearchResponse = serde_json::from_str(body)?;

    let first = match parsed.response.hits.into_iter().next() {
        Some(first) => first,
        None => return Ok(None),
    };
    let hit: SearchHit = serde_json::from_value(first)?;

    Ok(Some(SongResult::new(
        hit.result.title,
        hit.result.primary_artist.name,
        hit.result.url,
    )))
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

/// Shared HTTP client for the Genius API and lyrics pages
#[derive(Clone)]
pub struct GeniusClient {
    http: reqwest::Client,
    api_url: String,
    access_token: String,
}

impl GeniusClient {
    pub fn new(
        api_url: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LyricsError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            access_token: access_token.into(),
        })
    }

    pub fn from_config(config: &BotConfig) -> Result<Self, LyricsError> {
        Self::new(
            config.genius_api_url.clone(),
            config.genius_access_token.clone(),
            config.http_timeout,
        )
    }

    async fn try_search(&self, query: &str) -> Result<Option<SongResult>, LyricsError> {
        let url = format!("{}/search", self.api_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LyricsError::Status { url, status });
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }
}

#[async_trait]
impl SongSearch for GeniusClient {
    async fn search_song(&self, query: &str) -> Option<SongResult> {
        debug!("🔍 Searching Genius for: '{}'", query);

        match self.try_search(query).await {
            Ok(Some(song)) => {
                debug!("🔍 First hit: {} by {} ({})", song.title, song.artist, song.url);
                Some(song)
            }
            Ok(None) => {
                warn!("🔍 No search hits for query: '{}'", query);
                None
            }
            Err(e) => {
                error!("❌ Error searching for '{}': {}", query, e);
                None
            }
        }
    }
}

#[async_trait]
impl PageSource for GeniusClient {
    async fn fetch_page(&self, url: &str) -> Result<String, LyricsError> {
        debug!("📄 Fetching lyrics page: {}", url);

        let response = self.http.get(url).headers(browser_headers()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LyricsError::Status {
                url: url.to_string(),
                status,
            });
        }

        let page = response.text().await?;
        debug!("📄 Fetched {} bytes from {}", page.len(), url);
        Ok(page)
    }
}
