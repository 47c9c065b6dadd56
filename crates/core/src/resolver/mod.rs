//! Hash resolver: derives the canonical info hash for results that arrived
//! without one.
//!
//! Sources that only hand out a .torrent download link get that link fetched
//! with redirects disabled. A 200 body is parsed as bencoded metainfo and
//! the SHA-1 of the re-encoded `info` dictionary becomes the identifier; a
//! redirect response usually embeds the hash in its target (magnet links,
//! mirror URLs), so the first 40-hex token found there is used instead.

use std::time::Duration;

use futures::future::join_all;
use librqbit_core::torrent_metainfo::{torrent_from_bytes, TorrentMetaV1Owned};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::Client;
use thiserror::Error;
use tracing::warn;

use crate::scraper::RawResult;

static INFO_HASH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-fA-F0-9]{40})\b").expect("valid info hash pattern"));

/// Why a single resolution attempt produced no identifier.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Result has no download link")]
    MissingLink,

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse torrent metainfo: {0}")]
    Parse(String),

    #[error("Redirect response without a Location target")]
    NoRedirectTarget,

    #[error("No info hash token in redirect target")]
    NoHashInRedirect,
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ResolveError::Timeout
        } else {
            ResolveError::Network(e.to_string())
        }
    }
}

/// Compute the info hash of a .torrent body.
///
/// The metainfo parser re-encodes the `info` dictionary deterministically
/// and hashes those bytes, so surrounding document formatting cannot change
/// the result.
pub fn info_hash_from_bytes(bytes: &[u8]) -> Result<String, ResolveError> {
    let torrent: TorrentMetaV1Owned =
        torrent_from_bytes(bytes).map_err(|e| ResolveError::Parse(e.to_string()))?;
    Ok(torrent.info_hash.as_string().to_lowercase())
}

/// Extract the first 40-hex token from a redirect target.
pub fn info_hash_from_redirect(location: &str) -> Option<String> {
    INFO_HASH_PATTERN
        .captures(location)
        .map(|captures| captures[1].to_lowercase())
}

async fn fetch_hash(client: &Client, timeout: Duration, link: &str) -> Result<String, ResolveError> {
    let response = client.get(link).timeout(timeout).send().await?;

    if response.status().is_success() {
        let body = response.bytes().await?;
        return info_hash_from_bytes(&body);
    }

    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ResolveError::NoRedirectTarget)?;

    info_hash_from_redirect(location).ok_or(ResolveError::NoHashInRedirect)
}

/// Resolve the identifier for one indexed result.
///
/// A result that already carries a hash is returned unchanged (lower-cased)
/// without I/O. Failures resolve to `None` and a warning; the caller drops
/// such results, since the hash is the map key. No retries.
pub async fn resolve_hash(
    client: &Client,
    timeout: Duration,
    index: usize,
    result: &RawResult,
) -> (usize, Option<String>) {
    if let Some(hash) = &result.info_hash {
        return (index, Some(hash.to_lowercase()));
    }

    let Some(link) = &result.link else {
        warn!(tracker = %result.tracker, "Cannot resolve info hash: no download link");
        return (index, None);
    };

    match fetch_hash(client, timeout, link).await {
        Ok(hash) => (index, Some(hash)),
        Err(e) => {
            warn!(tracker = %result.tracker, link = %link, error = %e, "Failed to resolve info hash");
            (index, None)
        }
    }
}

/// Fan out one resolution task per result.
///
/// The client must have redirects disabled; redirect targets are inspected,
/// not followed. Output order matches completion order; callers key on the
/// returned index.
pub async fn resolve_all(
    client: &Client,
    timeout: Duration,
    results: &[(usize, &RawResult)],
) -> Vec<(usize, Option<String>)> {
    let tasks = results
        .iter()
        .map(|(index, result)| resolve_hash(client, timeout, *index, result));
    join_all(tasks).await
}
