//! Prowlarr backend: two-step protocol.
//!
//! Prowlarr cannot filter a search by indexer name, so the configured names
//! are first mapped to numeric ids via the indexer listing, then a single
//! id-filtered query is issued. Response fields are renamed into the common
//! schema.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::IndexerManagerConfig;
use crate::text::normalize_name;

use super::types::{RawResult, ScrapeError};

#[derive(Debug, Deserialize)]
struct ProwlarrIndexer {
    id: i64,
    name: String,
    #[serde(rename = "definitionName")]
    definition_name: String,
}

#[derive(Debug, Deserialize)]
struct ProwlarrResult {
    title: String,
    #[serde(rename = "infoHash")]
    info_hash: Option<String>,
    size: Option<u64>,
    seeders: Option<i64>,
    #[serde(rename = "downloadUrl")]
    download_url: Option<String>,
    indexer: String,
}

/// Map configured indexer selections to Prowlarr ids.
///
/// Matching is case/space/underscore-insensitive against both the display
/// name and the definition name, mirroring how selections are rendered in
/// configuration UIs.
fn match_indexer_ids(available: &[ProwlarrIndexer], selected: &[String]) -> Vec<i64> {
    let wanted: Vec<String> = selected.iter().map(|s| normalize_name(s)).collect();

    available
        .iter()
        .filter(|indexer| {
            wanted.contains(&normalize_name(&indexer.name))
                || wanted.contains(&normalize_name(&indexer.definition_name))
        })
        .map(|indexer| indexer.id)
        .collect()
}

/// Query Prowlarr: list indexers, then search the matched ids.
pub async fn search(
    client: &Client,
    config: &IndexerManagerConfig,
    indexers: &[String],
    query: &str,
) -> Result<Vec<RawResult>, ScrapeError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let base = config.url.trim_end_matches('/');

    let listing = client
        .get(format!("{base}/api/v1/indexer"))
        .header("X-Api-Key", &config.api_key)
        .timeout(timeout)
        .send()
        .await?;

    if !listing.status().is_success() {
        return Err(ScrapeError::Http(format!("HTTP {}", listing.status())));
    }

    let available: Vec<ProwlarrIndexer> = listing
        .json()
        .await
        .map_err(|e| ScrapeError::Parse(e.to_string()))?;

    let ids = match_indexer_ids(&available, indexers);
    debug!(matched = ids.len(), selected = indexers.len(), "Prowlarr indexers mapped");

    let id_filter = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join("&indexerIds=");
    let url = format!(
        "{base}/api/v1/search?query={}&indexerIds={}&type=search",
        urlencoding::encode(query),
        id_filter
    );

    let response = client
        .get(&url)
        .header("X-Api-Key", &config.api_key)
        .timeout(timeout)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ScrapeError::Http(format!("HTTP {}", response.status())));
    }

    let results: Vec<ProwlarrResult> = response
        .json()
        .await
        .map_err(|e| ScrapeError::Parse(e.to_string()))?;

    Ok(results.into_iter().map(into_raw_result).collect())
}

fn into_raw_result(r: ProwlarrResult) -> RawResult {
    RawResult {
        title: r.title,
        info_hash: r.info_hash.filter(|h| !h.is_empty()),
        size: r.size,
        seeders: r.seeders.and_then(|s| u32::try_from(s).ok()),
        tracker: r.indexer,
        tracker_id: None,
        link: r.download_url,
    }
}
