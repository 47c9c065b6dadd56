//! Jackett backend: single-call protocol.
//!
//! One request carries every selected tracker as a `Tracker[]` filter and
//! the response rows already use the common field names.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::IndexerManagerConfig;

use super::types::{RawResult, ScrapeError};

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResponse {
    Results: Vec<JackettResult>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResult {
    Title: String,
    InfoHash: Option<String>,
    Size: Option<i64>,
    Seeders: Option<i64>,
    Link: Option<String>,
    Tracker: Option<String>,
    TrackerId: Option<String>,
}

fn build_search_url(config: &IndexerManagerConfig, indexers: &[String], query: &str) -> String {
    let mut url = format!(
        "{}/api/v2.0/indexers/all/results?apikey={}&Query={}",
        config.url.trim_end_matches('/'),
        urlencoding::encode(&config.api_key),
        urlencoding::encode(query)
    );

    for indexer in indexers {
        // Selections arrive in webui form (underscores); Jackett wants the
        // spaced name.
        let name = indexer.replace('_', " ");
        url.push_str(&format!("&Tracker[]={}", urlencoding::encode(&name)));
    }

    url
}

/// Query Jackett for all selected indexers in one call.
pub async fn search(
    client: &Client,
    config: &IndexerManagerConfig,
    indexers: &[String],
    query: &str,
) -> Result<Vec<RawResult>, ScrapeError> {
    let url = build_search_url(config, indexers, query);
    debug!(indexers = ?indexers, "Searching Jackett");

    let response = client
        .get(&url)
        .timeout(Duration::from_secs(config.timeout_secs))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ScrapeError::Http(format!("HTTP {}", response.status())));
    }

    let body: JackettResponse = response
        .json()
        .await
        .map_err(|e| ScrapeError::Parse(e.to_string()))?;

    Ok(body.Results.into_iter().map(into_raw_result).collect())
}

fn into_raw_result(r: JackettResult) -> RawResult {
    RawResult {
        title: r.Title,
        info_hash: r.InfoHash.filter(|h| !h.is_empty()),
        size: r.Size.and_then(|s| u64::try_from(s).ok()),
        seeders: r.Seeders.and_then(|s| u32::try_from(s).ok()),
        tracker: r.Tracker.unwrap_or_default(),
        tracker_id: r.TrackerId,
        link: r.Link,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexerManagerKind;

    fn config() -> IndexerManagerConfig {
        IndexerManagerConfig {
            kind: IndexerManagerKind::Jackett,
            url: "http://localhost:9117/".to_string(),
            api_key: "test key".to_string(),
            timeout_secs: 30,
            indexers: vec![],
        }
    }

    #[test]
    fn test_build_search_url() {
        let url = build_search_url(
            &config(),
            &["the_pirate_bay".to_string(), "yts".to_string()],
            "some movie",
        );

        assert!(url.starts_with("http://localhost:9117/api/v2.0/indexers/all/results"));
        assert!(url.contains("apikey=test%20key"));
        assert!(url.contains("Query=some%20movie"));
        assert!(url.contains("Tracker[]=the%20pirate%20bay"));
        assert!(url.contains("Tracker[]=yts"));
    }

    #[test]
    fn test_into_raw_result() {
        let raw = into_raw_result(JackettResult {
            Title: "Movie 1080p".to_string(),
            InfoHash: Some("ABC".to_string()),
            Size: Some(1_000_000),
            Seeders: Some(12),
            Link: Some("http://dl".to_string()),
            Tracker: Some("The Pirate Bay".to_string()),
            TrackerId: Some("thepiratebay".to_string()),
        });

        assert_eq!(raw.info_hash.as_deref(), Some("ABC"));
        assert_eq!(raw.size, Some(1_000_000));
        assert_eq!(raw.seeders, Some(12));
        assert_eq!(raw.allow_key(), "thepiratebay");
    }

    #[test]
    fn test_into_raw_result_sentinels() {
        let raw = into_raw_result(JackettResult {
            Title: "t".to_string(),
            InfoHash: Some(String::new()),
            Size: Some(-1),
            Seeders: None,
            Link: None,
            Tracker: None,
            TrackerId: None,
        });

        // Empty hash and negative size are treated as unknown.
        assert!(raw.info_hash.is_none());
        assert!(raw.size.is_none());
        assert!(raw.seeders.is_none());
    }
}
