//! Types for the source query fan-out.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What kind of media is being searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    /// Path segment used by stream-addon style endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
        }
    }
}

/// One aggregation request as seen by the scrapers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRequest {
    /// Human title used for text search.
    pub title: String,
    pub media_type: MediaType,
    /// External catalog id, including season/episode suffix for series
    /// (e.g. "tt1234567:1:2").
    pub external_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl MediaRequest {
    /// Short form for log lines.
    pub fn log_name(&self) -> String {
        match (self.season, self.episode) {
            (Some(season), Some(episode)) => {
                format!("{} S{:02}E{:02}", self.title, season, episode)
            }
            _ => self.title.clone(),
        }
    }
}

/// A search result normalized into the common schema, before metadata
/// classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResult {
    pub title: String,
    /// 40-hex info hash when the source reports one.
    pub info_hash: Option<String>,
    pub size: Option<u64>,
    pub seeders: Option<u32>,
    /// Display label of the source ("DMM", "Torrentio|TrackerX", indexer
    /// name).
    pub tracker: String,
    /// Indexer-manager tracker id when the protocol distinguishes it from
    /// the display label (Jackett's TrackerId).
    pub tracker_id: Option<String>,
    /// .torrent download link, used by the hash resolver.
    pub link: Option<String>,
}

impl RawResult {
    /// Identifier compared against the uncached-tracker allow-list.
    ///
    /// Jackett reports a distinct tracker id; Prowlarr and the secondary
    /// sources only carry the display label.
    pub fn allow_key(&self) -> &str {
        self.tracker_id.as_deref().unwrap_or(&self.tracker)
    }
}

/// Failure of a single source query. The fan-out coordinator converts these
/// into empty contributions; they never abort an aggregation.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ScrapeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ScrapeError::Timeout
        } else if e.is_connect() {
            ScrapeError::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            ScrapeError::Parse(e.to_string())
        } else {
            ScrapeError::Http(e.to_string())
        }
    }
}
