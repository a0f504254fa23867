// aggregate.rs - Playlist Duration Aggregation
// Walks every page of a playlist, looks up each member's duration one at a time,
// and folds the results into a PlaylistSummary.
//
// This is the single failure boundary for a playlist request: errors from the
// catalog propagate up to here, get logged with full detail, and reach the user
// only as a generic message.
//
// Used by: commands/playlist.rs

use crate::extract::PlaylistReference;
use crate::youtube::{Catalog, CatalogError};
use log::{error, info};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

pub const INVALID_URL_MESSAGE: &str =
    "Invalid playlist URL. Please provide a valid YouTube playlist link.";
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred while processing the playlist.";

const LIST_MARKER: &str = "list=";

#[derive(Debug, Error)]
pub enum AggregateError {
    /// The link carries no playlist id. User input problem, not a fault.
    #[error("playlist URL has no list= parameter")]
    InvalidUrl,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("playlist processing exceeded the {0:?} deadline")]
    DeadlineExceeded(Duration),
    #[error("total playlist duration overflowed after {0} videos")]
    TotalOverflow(u64),
}

impl AggregateError {
    pub fn is_user_error(&self) -> bool {
        matches!(self, AggregateError::InvalidUrl)
    }

    /// Text shown in chat. Operational failures never expose details.
    pub fn user_message(&self) -> &'static str {
        match self {
            AggregateError::InvalidUrl => INVALID_URL_MESSAGE,
            AggregateError::Catalog(_)
            | AggregateError::DeadlineExceeded(_)
            | AggregateError::TotalOverflow(_) => GENERIC_ERROR_MESSAGE,
        }
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub total_seconds: u64,
    pub video_count: u64,
}

impl PlaylistSummary {
    fn add(&mut self, seconds: u64) -> Result<(), AggregateError> {
        self.total_seconds = self
            .total_seconds
            .checked_add(seconds)
            .ok_or(AggregateError::TotalOverflow(self.video_count))?;
        self.video_count += 1;
        Ok(())
    }

    /// Truncating average; 0 for an empty playlist.
    pub fn average_seconds(&self) -> u64 {
        if self.video_count == 0 {
            0
        } else {
            self.total_seconds / self.video_count
        }
    }
}

impl fmt::Display for PlaylistSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_minutes = self.total_seconds / 60;
        let (hours, minutes) = (total_minutes / 60, total_minutes % 60);
        let average = self.average_seconds();
        let (avg_minutes, avg_seconds) = (average / 60, average % 60);

        write!(
            f,
            "Playlist Duration:\n\
            - Total: {} hours, {} minutes\n\
            - Videos: {}\n\
            - Average per Video: {} minutes, {} seconds",
            hours, minutes, self.video_count, avg_minutes, avg_seconds
        )
    }
}

/// Everything after the first `list=`, or `None` when there is no usable id.
fn playlist_id_of(url: &str) -> Option<&str> {
    url.split_once(LIST_MARKER)
        .map(|(_, id)| id)
        .filter(|id| !id.is_empty())
}

// ============================================================================
// AGGREGATOR
// ============================================================================

pub struct PlaylistAggregator<C> {
    catalog: C,
    deadline: Duration,
}

impl<C: Catalog> PlaylistAggregator<C> {
    pub fn new(catalog: C, deadline: Duration) -> Self {
        Self { catalog, deadline }
    }

    #[cfg(test)]
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Sum the durations of every video in the referenced playlist.
    pub async fn aggregate(&self, reference: &PlaylistReference) -> Result<PlaylistSummary, AggregateError> {
        let playlist_id = playlist_id_of(reference.as_str()).ok_or(AggregateError::InvalidUrl)?;

        tokio::time::timeout(self.deadline, self.walk_playlist(playlist_id))
            .await
            .map_err(|_| AggregateError::DeadlineExceeded(self.deadline))?
    }

    // START -> FETCHING_PAGE -> (next token ? FETCHING_PAGE : DONE)
    async fn walk_playlist(&self, playlist_id: &str) -> Result<PlaylistSummary, AggregateError> {
        let mut summary = PlaylistSummary::default();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .catalog
                .playlist_page(playlist_id, page_token.as_deref())
                .await?;

            for video_id in &page.video_ids {
                let seconds = self.catalog.video_duration(video_id).await?;
                summary.add(seconds)?;
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(summary)
    }

    /// Run an aggregation and turn the outcome into the chat reply.
    /// Never fails: operational errors are logged and collapsed to one generic message.
    pub async fn report(&self, reference: &PlaylistReference) -> String {
        let request_id = Uuid::new_v4();
        let start_time = Instant::now();
        info!("📺 [{}] Processing playlist {}", request_id, reference);

        match self.aggregate(reference).await {
            Ok(summary) => {
                info!(
                    "✅ [{}] {} videos, {}s total in {:.2}s",
                    request_id,
                    summary.video_count,
                    summary.total_seconds,
                    start_time.elapsed().as_secs_f64()
                );
                summary.to_string()
            }
            Err(e) if e.is_user_error() => {
                info!("❓ [{}] Rejected playlist link: {}", request_id, e);
                e.user_message().to_string()
            }
            Err(e) => {
                error!("❌ [{}] Error fetching playlist data: {}", request_id, e);
                e.user_message().to_string()
            }
        }
    }
}
