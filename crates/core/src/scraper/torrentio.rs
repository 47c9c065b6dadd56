//! Public fallback scrape source (stream-addon API).
//!
//! Unauthenticated, so direct requests get rate limited or blacklisted; a
//! failed attempt is retried once through the configured HTTP proxy when one
//! is available.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::TorrentioConfig;

use super::types::{MediaRequest, RawResult, ScrapeError};

#[derive(Debug, Deserialize)]
struct StreamsResponse {
    streams: Vec<Stream>,
}

#[derive(Debug, Deserialize)]
struct Stream {
    title: String,
    #[serde(rename = "infoHash")]
    info_hash: Option<String>,
}

/// Split a multi-line stream title into (title, tracker label).
///
/// Shape: `"Torrent Name\nFile Name\n👤 42 💾 2.1 GB ⚙️ TrackerX"`. The 👤
/// marker starts the decoration block; the tracker follows the ⚙️ marker.
fn parse_stream_title(raw: &str) -> (String, Option<String>) {
    let title = match raw.split_once("\n👤") {
        Some((head, _)) => head.to_string(),
        None => raw.to_string(),
    };

    let tracker = raw
        .split_once("⚙️ ")
        .map(|(_, tail)| tail.lines().next().unwrap_or(tail).to_string());

    (title, tracker)
}

async fn fetch(client: &Client, url: &str) -> Result<StreamsResponse, ScrapeError> {
    let response = client
        .get(url)
        .timeout(Duration::from_secs(30))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ScrapeError::Http(format!("HTTP {}", response.status())));
    }

    response
        .json()
        .await
        .map_err(|e| ScrapeError::Parse(e.to_string()))
}

/// Query the fallback source, retrying through the proxy client on failure.
pub async fn search(
    client: &Client,
    proxy_client: Option<&Client>,
    config: &TorrentioConfig,
    request: &MediaRequest,
) -> Result<Vec<RawResult>, ScrapeError> {
    let url = format!(
        "{}/stream/{}/{}.json",
        config.base_url.trim_end_matches('/'),
        request.media_type.as_str(),
        request.external_id
    );

    let body = match fetch(client, &url).await {
        Ok(body) => body,
        Err(e) => match proxy_client {
            Some(proxied) => {
                debug!(error = %e, "Direct fallback-source request failed, retrying via proxy");
                fetch(proxied, &url).await?
            }
            None => return Err(e),
        },
    };

    Ok(body
        .streams
        .into_iter()
        .map(|stream| {
            let (title, tracker) = parse_stream_title(&stream.title);
            RawResult {
                title,
                info_hash: stream.info_hash.filter(|h| !h.is_empty()),
                size: None,
                seeders: None,
                tracker: match tracker {
                    Some(t) => format!("Torrentio|{t}"),
                    None => "Torrentio".to_string(),
                },
                tracker_id: None,
                link: None,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stream_title_full_shape() {
        let raw = "Movie.2023.1080p\nMovie.2023.1080p.mkv\n👤 42 💾 2.1 GB ⚙️ TrackerX";
        let (title, tracker) = parse_stream_title(raw);

        assert_eq!(title, "Movie.2023.1080p\nMovie.2023.1080p.mkv");
        assert_eq!(tracker.as_deref(), Some("TrackerX"));
    }

    #[test]
    fn test_parse_stream_title_no_markers() {
        let (title, tracker) = parse_stream_title("Just A Title");
        assert_eq!(title, "Just A Title");
        assert!(tracker.is_none());
    }

    #[test]
    fn test_parse_stream_title_tracker_not_last_line() {
        let raw = "Name\n👤 10 ⚙️ Rarbg\nextra";
        let (title, tracker) = parse_stream_title(raw);
        assert_eq!(title, "Name");
        assert_eq!(tracker.as_deref(), Some("Rarbg"));
    }

    #[test]
    fn test_streams_response_decoding() {
        let json = r#"{"streams": [{"title": "A\n👤 1 ⚙️ T", "infoHash": "abc"}]}"#;
        let body: StreamsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.streams.len(), 1);
        assert_eq!(body.streams[0].info_hash.as_deref(), Some("abc"));
    }
}
