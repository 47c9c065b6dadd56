//! Source query fan-out.
//!
//! One task per enabled source, each under its own timeout. A failed or
//! timed-out source contributes an empty list and a warning; aggregation
//! never aborts because one source failed.

mod jackett;
mod prowlarr;
mod torrentio;
mod types;
mod zilean;

pub use types::*;

use reqwest::Client;
use tracing::{info, warn};

use crate::config::{IndexerManagerKind, Settings, UserConfig};

/// Convert a per-source outcome into its contribution, logging failures.
fn contribution(
    source: &str,
    log_name: &str,
    result: Result<Vec<RawResult>, ScrapeError>,
) -> Vec<RawResult> {
    match result {
        Ok(results) => {
            info!(source, count = results.len(), "{} torrents found for {}", results.len(), log_name);
            results
        }
        Err(e) => {
            warn!(source, error = %e, "Source query failed for {}, skipping", log_name);
            Vec::new()
        }
    }
}

/// Query every enabled source concurrently and concatenate the normalized
/// results in fixed source order (indexer manager, scrape index, fallback),
/// so output order never depends on task completion order.
pub async fn scrape_all(
    client: &Client,
    proxy_client: Option<&Client>,
    settings: &Settings,
    request: &MediaRequest,
    config: &UserConfig,
) -> Vec<RawResult> {
    let log_name = request.log_name();

    // Uncached-only trackers must be queried too; they are filtered against
    // their own allow-list later.
    let mut selection: Vec<String> = config.indexers.clone();
    for indexer in &config.indexers_uncached {
        if !selection.contains(indexer) {
            selection.push(indexer.clone());
        }
    }

    let manager_task = async {
        let Some(manager) = &settings.indexer_manager else {
            return Vec::new();
        };
        if selection.is_empty() {
            return Vec::new();
        }
        let result = match manager.kind {
            IndexerManagerKind::Jackett => {
                jackett::search(client, manager, &selection, &request.title).await
            }
            IndexerManagerKind::Prowlarr => {
                prowlarr::search(client, manager, &selection, &request.title).await
            }
        };
        contribution("indexer_manager", &log_name, result)
    };

    let zilean_task = async {
        let Some(zilean) = &settings.zilean else {
            return Vec::new();
        };
        contribution("zilean", &log_name, zilean::search(client, zilean, request).await)
    };

    let torrentio_task = async {
        if !settings.torrentio.enabled {
            return Vec::new();
        }
        contribution(
            "torrentio",
            &log_name,
            torrentio::search(client, proxy_client, &settings.torrentio, request).await,
        )
    };

    let (manager, zilean, torrentio) = tokio::join!(manager_task, zilean_task, torrentio_task);

    let mut results = manager;
    results.extend(zilean);
    results.extend(torrentio);
    results
}
