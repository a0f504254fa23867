// youtube.rs - YouTube Data API Catalog Client
// This module talks to the two YouTube Data API v3 endpoints the bot needs:
// playlist member listing (paged) and per-video content details.
//
// Key Features:
// - Typed response schemas with documented fallbacks for missing fields
// - Continuation tokens forwarded verbatim, empty tokens treated as the last page
// - Non-2xx responses (quota exhaustion, bad key) surfaced as errors with the API's message
// - Request URLs (which carry the API key) stripped from transport errors
// - Catalog trait so the aggregator can run against an in-memory catalog in tests
//
// Used by: aggregate.rs, main.rs (client construction)

use crate::duration::{parse_iso8601_duration, DurationError};
use async_trait::async_trait;
use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Largest page the playlistItems endpoint will return.
pub const PAGE_SIZE: usize = 50;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid video duration: {0}")]
    Duration(#[from] DurationError),
}

// ============================================================================
// RESPONSE SCHEMAS
// ============================================================================

// playlistItems?part=contentDetails
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: PlaylistItemDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemDetails {
    video_id: String,
}

// videos?part=contentDetails
#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<Video>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Video {
    content_details: Option<VideoDetails>,
}

#[derive(Debug, Deserialize)]
struct VideoDetails {
    duration: Option<String>,
}

// {"error": {"code": 403, "message": "..."}}
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// One page of playlist members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistPage {
    pub video_ids: Vec<String>,
    /// Opaque cursor for the next page; `None` on the last page.
    pub next_page_token: Option<String>,
}

impl From<PlaylistItemsResponse> for PlaylistPage {
    fn from(response: PlaylistItemsResponse) -> Self {
        PlaylistPage {
            video_ids: response
                .items
                .into_iter()
                .map(|item| item.content_details.video_id)
                .collect(),
            next_page_token: response.next_page_token.filter(|token| !token.is_empty()),
        }
    }
}

// ============================================================================
// CATALOG TRAIT
// ============================================================================

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch up to [`PAGE_SIZE`] members of a playlist.
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, CatalogError>;

    /// Duration of one video in whole seconds.
    /// Unavailable videos (deleted, private, region-blocked) count as 0.
    async fn video_duration(&self, video_id: &str) -> Result<u64, CatalogError>;
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct YouTubeCatalog {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl YouTubeCatalog {
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("playlist-duration-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Http(e.without_url()))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        trace!("[CATALOG] GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| CatalogError::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Http(e.without_url()))?;

        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

// Prefer the API's own message, fall back to a clipped body
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.chars().take(200).collect(),
    }
}

#[async_trait]
impl Catalog for YouTubeCatalog {
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, CatalogError> {
        let max_results = PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "contentDetails"),
            ("maxResults", max_results.as_str()),
            ("playlistId", playlist_id),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response: PlaylistItemsResponse = self.get_json("playlistItems", &query).await?;
        let page = PlaylistPage::from(response);
        debug!(
            "📄 Playlist {} page fetched: {} items, more pages: {}",
            playlist_id,
            page.video_ids.len(),
            page.next_page_token.is_some()
        );
        Ok(page)
    }

    async fn video_duration(&self, video_id: &str) -> Result<u64, CatalogError> {
        let query = [("part", "contentDetails"), ("id", video_id)];
        let response: VideoListResponse = self.get_json("videos", &query).await?;

        let duration = response
            .items
            .into_iter()
            .next()
            .and_then(|video| video.content_details)
            .and_then(|details| details.duration);

        match duration {
            Some(text) => Ok(parse_iso8601_duration(&text)?),
            None => {
                debug!("🚫 Video {} unavailable, counting as 0 seconds", video_id);
                Ok(0)
            }
        }
    }
}

// ============================================================================
// IN-MEMORY CATALOG FOR TESTS
// ============================================================================

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a playlist split into pages of `PAGE_SIZE`, counting every call.
    #[derive(Default)]
    pub struct FakeCatalog {
        pages: HashMap<Option<String>, PlaylistPage>,
        durations: HashMap<String, u64>,
        failing_token: Option<String>,
        page_fetches: AtomicUsize,
        lookups: AtomicUsize,
    }

    impl FakeCatalog {
        /// Playlist whose videos have the given durations; `None` means unavailable.
        pub fn with_durations(durations: &[Option<u64>]) -> Self {
            let mut catalog = FakeCatalog::default();
            let ids: Vec<String> = (0..durations.len()).map(|i| format!("vid{}", i)).collect();

            for (id, duration) in ids.iter().zip(durations) {
                if let Some(seconds) = duration {
                    catalog.durations.insert(id.clone(), *seconds);
                }
            }

            let chunks: Vec<&[String]> = ids.chunks(PAGE_SIZE).collect();
            if chunks.is_empty() {
                catalog.pages.insert(None, PlaylistPage::default());
            }
            for (index, chunk) in chunks.iter().enumerate() {
                let token = (index > 0).then(|| format!("page-{}", index));
                let next_page_token = (index + 1 < chunks.len()).then(|| format!("page-{}", index + 1));
                catalog.pages.insert(
                    token,
                    PlaylistPage {
                        video_ids: chunk.to_vec(),
                        next_page_token,
                    },
                );
            }
            catalog
        }

        /// Playlist of `count` videos, each `seconds` long.
        pub fn uniform(count: usize, seconds: u64) -> Self {
            Self::with_durations(&vec![Some(seconds); count])
        }

        /// Fail the page fetch that carries `token`.
        pub fn failing_at(mut self, token: &str) -> Self {
            self.failing_token = Some(token.to_string());
            self
        }

        pub fn page_fetches(&self) -> usize {
            self.page_fetches.load(Ordering::SeqCst)
        }

        pub fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn playlist_page(
            &self,
            _playlist_id: &str,
            page_token: Option<&str>,
        ) -> Result<PlaylistPage, CatalogError> {
            self.page_fetches.fetch_add(1, Ordering::SeqCst);
            if page_token.is_some() && page_token == self.failing_token.as_deref() {
                return Err(CatalogError::Status {
                    status: 503,
                    message: "backend unavailable".to_string(),
                });
            }
            Ok(self
                .pages
                .get(&page_token.map(str::to_string))
                .cloned()
                .unwrap_or_default())
        }

        async fn video_duration(&self, video_id: &str) -> Result<u64, CatalogError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.durations.get(video_id).copied().unwrap_or(0))
        }
    }
}
