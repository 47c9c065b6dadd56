//! Zilean (DMM) backend: season-aware scrape index.
//!
//! Movies go through the plain text search endpoint; episodes use the
//! filtered endpoint with season/episode parameters. Responses already carry
//! an info hash, so these results never need the hash resolver.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::config::ZileanConfig;

use super::types::{MediaRequest, RawResult, ScrapeError};

const TRACKER_LABEL: &str = "DMM";

#[derive(Debug, Deserialize)]
struct ZileanResult {
    raw_title: String,
    info_hash: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    size: Option<u64>,
}

/// Zilean reports sizes as either a number or a numeric string depending on
/// version; accept both.
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }))
}

/// Query the scrape index, season-aware.
pub async fn search(
    client: &Client,
    config: &ZileanConfig,
    request: &MediaRequest,
) -> Result<Vec<RawResult>, ScrapeError> {
    let base = config.url.trim_end_matches('/');
    let timeout = Duration::from_secs(30);

    let response = match (request.season, request.episode) {
        (Some(season), Some(episode)) => {
            client
                .get(format!(
                    "{base}/dmm/filtered?query={}&season={season}&episode={episode}",
                    urlencoding::encode(&request.title)
                ))
                .timeout(timeout)
                .send()
                .await?
        }
        _ => {
            client
                .post(format!("{base}/dmm/search"))
                .json(&serde_json::json!({ "queryText": request.title }))
                .timeout(timeout)
                .send()
                .await?
        }
    };

    if !response.status().is_success() {
        return Err(ScrapeError::Http(format!("HTTP {}", response.status())));
    }

    let results: Vec<ZileanResult> = response
        .json()
        .await
        .map_err(|e| ScrapeError::Parse(e.to_string()))?;

    let taken = results.len().min(config.take_first);
    debug!(found = results.len(), taken, "Zilean search complete");

    Ok(results
        .into_iter()
        .take(config.take_first)
        .map(|r| RawResult {
            title: r.raw_title,
            info_hash: Some(r.info_hash),
            size: r.size,
            seeders: None,
            tracker: TRACKER_LABEL.to_string(),
            tracker_id: None,
            link: None,
        })
        .collect())
}
