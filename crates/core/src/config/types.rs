use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::text::normalize_name;

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Indexer manager (Jackett or Prowlarr). Optional: an instance can run
    /// on secondary sources alone.
    #[serde(default)]
    pub indexer_manager: Option<IndexerManagerConfig>,
    /// Season-aware scrape-index source.
    #[serde(default)]
    pub zilean: Option<ZileanConfig>,
    /// Public fallback scrape source.
    #[serde(default)]
    pub torrentio: TorrentioConfig,
    /// HTTP proxy used for the fallback-source retry path.
    #[serde(default)]
    pub debrid_proxy_url: Option<String>,
    /// Cache entry validity in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Timeout for fetching a .torrent body during hash resolution.
    #[serde(default = "default_torrent_timeout")]
    pub get_torrent_timeout_secs: u64,
    /// Reject results whose title does not fuzzy-match the query.
    #[serde(default = "default_true")]
    pub title_match_check: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            indexer_manager: None,
            zilean: None,
            torrentio: TorrentioConfig::default(),
            debrid_proxy_url: None,
            cache_ttl_secs: default_cache_ttl(),
            get_torrent_timeout_secs: default_torrent_timeout(),
            title_match_check: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/magnetar.db")
}

/// Which indexer-manager protocol to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexerManagerKind {
    /// Single-call protocol: one request carries all tracker filters.
    Jackett,
    /// Two-step protocol: list indexers first, then query by id.
    Prowlarr,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerManagerConfig {
    pub kind: IndexerManagerKind,
    /// Base URL (e.g. "http://localhost:9117").
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_indexer_timeout")]
    pub timeout_secs: u64,
    /// Allow-list of indexer names users may select.
    #[serde(default)]
    pub indexers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZileanConfig {
    pub url: String,
    /// Cap on results taken from a single response.
    #[serde(default = "default_take_first")]
    pub take_first: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TorrentioConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_torrentio_url")]
    pub base_url: String,
}

impl Default for TorrentioConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_torrentio_url(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    86400
}

fn default_torrent_timeout() -> u64 {
    5
}

fn default_indexer_timeout() -> u64 {
    30
}

fn default_take_first() -> usize {
    500
}

fn default_torrentio_url() -> String {
    "https://torrentio.strem.fun".to_string()
}

fn default_true() -> bool {
    true
}

/// Debrid provider selected by the user. Resolving candidates into stream
/// links is a collaborator concern; the engine only carries the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DebridService {
    RealDebrid,
    AllDebrid,
    Premiumize,
    Torbox,
    DebridLink,
}

impl DebridService {
    /// Short label shown next to results ("RD", "AD", ...).
    pub fn extension(&self) -> &'static str {
        match self {
            DebridService::RealDebrid => "RD",
            DebridService::AllDebrid => "AD",
            DebridService::Premiumize => "PM",
            DebridService::Torbox => "TB",
            DebridService::DebridLink => "DL",
        }
    }
}

/// Per-request configuration, decoded by the transport layer.
///
/// Field names match the wire format. Values arrive untrusted; call
/// [`UserConfig::sanitized`] before handing the config to any component.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    #[serde(default)]
    pub indexers: Vec<String>,
    #[serde(default)]
    pub indexers_uncached: Vec<String>,
    #[serde(default = "default_all")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub language_preference: Vec<String>,
    #[serde(default = "default_all")]
    pub resolutions: Vec<String>,
    #[serde(default = "default_all")]
    pub result_format: Vec<String>,
    #[serde(default)]
    pub resolutions_order: Vec<String>,
    #[serde(default = "default_sort_type")]
    pub sort_type: String,
    /// Result budget; 0 = unbounded.
    #[serde(default)]
    pub max_results: i64,
    /// Size cap in bytes; 0 = unbounded.
    #[serde(default)]
    pub max_size: i64,
    /// Cap on promoted uncached candidates; 0 = unbounded.
    #[serde(default)]
    pub max_uncached: i64,
    pub debrid_service: DebridService,
    pub debrid_api_key: String,
}

fn default_all() -> Vec<String> {
    vec!["All".to_string()]
}

fn default_sort_type() -> String {
    "Sort_by_Rank".to_string()
}

impl UserConfig {
    /// Clamp negative caps to zero and drop indexer selections outside the
    /// configured allow-list (case/space/underscore-insensitive).
    pub fn sanitized(&self, settings: &Settings) -> UserConfig {
        let mut config = self.clone();

        config.max_results = config.max_results.max(0);
        config.max_size = config.max_size.max(0);
        config.max_uncached = config.max_uncached.max(0);

        if let Some(manager) = &settings.indexer_manager {
            let allowed: Vec<String> = manager.indexers.iter().map(|i| normalize_name(i)).collect();
            let keep = |selection: &[String]| {
                selection
                    .iter()
                    .filter(|i| allowed.contains(&normalize_name(i)))
                    .cloned()
                    .collect::<Vec<_>>()
            };
            config.indexers = keep(&config.indexers);
            config.indexers_uncached = keep(&config.indexers_uncached);
        } else {
            config.indexers.clear();
            config.indexers_uncached.clear();
        }

        config
    }
}
