//! Aggregation engine: one entry point that runs the whole pipeline.
//!
//! Scrape fan-out, title filtering, hash resolution, uncached promotion,
//! caching, ranking and display formatting, in that order. Every failure
//! along the way degrades to a smaller result set; nothing here aborts an
//! aggregation once it started.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::candidate::{Candidate, CandidateSet};
use crate::classifier::{filter_titles, MetadataClassifier};
use crate::config::{Settings, UserConfig};
use crate::format::format_display;
use crate::ranker::{self, RankedBucket};
use crate::resolver;
use crate::scraper::{self, MediaRequest, RawResult};
use crate::store::{self, TorrentStore};
use crate::text::normalize_name;

/// Errors raised while constructing the engine. Aggregation itself never
/// fails; see the module docs.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// The HTTP clients the pipeline needs, built once per engine.
///
/// `torrent` has redirects disabled so the resolver can inspect redirect
/// targets instead of following them. `proxy` exists only when a debrid
/// proxy URL is configured and backs the fallback-source retry path.
pub struct HttpClients {
    pub api: Client,
    pub torrent: Client,
    pub proxy: Option<Client>,
}

impl HttpClients {
    fn new(settings: &Settings) -> Result<Self, EngineError> {
        let build_err = |e: reqwest::Error| EngineError::HttpClient(e.to_string());

        let api = Client::builder().build().map_err(build_err)?;
        let torrent = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(build_err)?;

        let proxy = match &settings.debrid_proxy_url {
            Some(url) => {
                let proxy = reqwest::Proxy::all(url)
                    .map_err(|e| EngineError::HttpClient(e.to_string()))?;
                Some(Client::builder().proxy(proxy).build().map_err(build_err)?)
            }
            None => None,
        };

        Ok(Self { api, torrent, proxy })
    }
}

/// Result of one aggregation request.
#[derive(Debug)]
pub struct Aggregation {
    /// Ordered buckets of selected hashes, total bounded by `maxResults`.
    pub buckets: Vec<RankedBucket>,
    /// Every surviving candidate, keyed by info hash.
    pub candidates: CandidateSet,
    /// Formatted display string per selected hash.
    pub displays: HashMap<String, String>,
}

/// The aggregation engine. One instance serves many requests.
pub struct Aggregator {
    settings: Settings,
    clients: HttpClients,
    store: Arc<dyn TorrentStore>,
    classifier: Arc<dyn MetadataClassifier>,
}

/// Cache key over the query identity and the result-affecting subset of the
/// user configuration. Presentation-only fields (`resultFormat`) and
/// credentials are excluded, so cosmetic changes share cache entries.
pub fn cache_fingerprint(request: &MediaRequest, config: &UserConfig) -> Vec<u8> {
    let seed = serde_json::json!({
        "externalId": request.external_id,
        "mediaType": request.media_type.as_str(),
        "season": request.season,
        "episode": request.episode,
        "indexers": config.indexers,
        "indexersUncached": config.indexers_uncached,
        "languages": config.languages,
        "languagePreference": config.language_preference,
        "resolutions": config.resolutions,
        "resolutionsOrder": config.resolutions_order,
        "sortType": config.sort_type,
        "maxResults": config.max_results,
        "maxSize": config.max_size,
        "maxUncached": config.max_uncached,
    });

    Sha256::digest(seed.to_string().as_bytes()).to_vec()
}

impl Aggregator {
    pub fn new(
        settings: Settings,
        store: Arc<dyn TorrentStore>,
        classifier: Arc<dyn MetadataClassifier>,
    ) -> Result<Self, EngineError> {
        let clients = HttpClients::new(&settings)?;
        Ok(Self {
            settings,
            clients,
            store,
            classifier,
        })
    }

    /// Run one aggregation. `config` must already be sanitized.
    pub async fn aggregate(&self, request: &MediaRequest, config: &UserConfig) -> Aggregation {
        let fingerprint = cache_fingerprint(request, config);

        if let Some(candidates) = self.cached_candidates(&fingerprint) {
            info!(name = %request.log_name(), count = candidates.len(), "Serving cached results");
            return self.present(candidates, config);
        }

        let mut raw = scraper::scrape_all(
            &self.clients.api,
            self.clients.proxy.as_ref(),
            &self.settings,
            request,
            config,
        )
        .await;

        if self.settings.title_match_check {
            raw = self.reject_title_mismatches(raw, &request.title);
        }

        self.resolve_missing_hashes(&mut raw).await;
        raw.retain(|result| result.info_hash.is_some());

        let mut candidates = self.build_candidates(&raw, config);

        store::merge_uncached(
            &mut candidates,
            &raw,
            &fingerprint,
            &config.indexers_uncached,
            usize::try_from(config.max_uncached).unwrap_or(0),
            self.store.as_ref(),
        );

        match serde_json::to_string(&candidates) {
            Ok(serialized) => {
                if let Err(e) = self.store.put_cache(&fingerprint, &serialized) {
                    warn!(error = %e, "Failed to write cache entry, serving uncached");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize candidate set, skipping cache write"),
        }

        info!(name = %request.log_name(), count = candidates.len(), "Aggregation complete");
        self.present(candidates, config)
    }

    /// Valid cache entry for the fingerprint, if any. Read errors, expired
    /// entries and undecodable payloads all degrade to a miss.
    fn cached_candidates(&self, fingerprint: &[u8]) -> Option<CandidateSet> {
        let entry = match self.store.get_cache(fingerprint) {
            Ok(entry) => entry?,
            Err(e) => {
                warn!(error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        let age = Utc::now().timestamp() - entry.timestamp;
        if age >= self.settings.cache_ttl_secs as i64 {
            return None;
        }

        match serde_json::from_str(&entry.results) {
            Ok(candidates) => Some(candidates),
            Err(e) => {
                warn!(error = %e, "Undecodable cache entry, treating as miss");
                None
            }
        }
    }

    fn reject_title_mismatches(&self, raw: Vec<RawResult>, wanted: &str) -> Vec<RawResult> {
        let titles: Vec<(usize, String)> = raw
            .iter()
            .enumerate()
            .map(|(index, result)| (index, result.title.clone()))
            .collect();
        let verdicts = filter_titles(&titles, wanted, self.classifier.as_ref());

        let keep: HashSet<usize> = verdicts
            .into_iter()
            .filter_map(|(index, matched)| matched.then_some(index))
            .collect();

        let before = raw.len();
        let raw: Vec<RawResult> = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, result)| keep.contains(&index).then_some(result))
            .collect();
        info!(kept = raw.len(), rejected = before - raw.len(), "Title filter applied");
        raw
    }

    /// Fill in missing info hashes in place. Results that stay unresolved
    /// keep `info_hash = None` and are dropped by the caller.
    async fn resolve_missing_hashes(&self, raw: &mut [RawResult]) {
        let pending: Vec<(usize, &RawResult)> = raw
            .iter()
            .enumerate()
            .filter(|(_, result)| result.info_hash.is_none())
            .map(|(index, result)| (index, &*result))
            .collect();
        if pending.is_empty() {
            return;
        }

        let timeout = Duration::from_secs(self.settings.get_torrent_timeout_secs);
        let resolved = resolver::resolve_all(&self.clients.torrent, timeout, &pending).await;

        for (index, hash) in resolved {
            raw[index].info_hash = hash;
        }
    }

    /// Insert scraped results as regular candidates, in scrape order.
    ///
    /// Trackers selected only for uncached promotion are left out here; the
    /// uncached merge picks them up afterwards. Duplicate hashes keep the
    /// first occurrence.
    fn build_candidates(&self, raw: &[RawResult], config: &UserConfig) -> CandidateSet {
        let cached_selection: HashSet<String> =
            config.indexers.iter().map(|i| normalize_name(i)).collect();
        let uncached_only: HashSet<String> = config
            .indexers_uncached
            .iter()
            .map(|i| normalize_name(i))
            .filter(|key| !cached_selection.contains(key))
            .collect();

        let mut candidates = CandidateSet::new();
        for result in raw {
            if uncached_only.contains(&normalize_name(result.allow_key())) {
                continue;
            }
            let Some(hash) = &result.info_hash else {
                continue;
            };

            let parsed = self.classifier.parse(&result.title);
            candidates.insert(
                hash,
                Candidate {
                    title: result.title.clone(),
                    size: result.size,
                    seeders: result.seeders,
                    tracker: Some(result.tracker.clone()),
                    link: result.link.clone(),
                    resolution: parsed.resolution,
                    languages: parsed.languages,
                    is_multi_audio: parsed.is_multi_audio,
                    uncached: false,
                    quality: parsed.quality,
                    index: None,
                },
            );
        }
        candidates
    }

    fn present(&self, candidates: CandidateSet, config: &UserConfig) -> Aggregation {
        let buckets = ranker::balance(&candidates, config);

        let mut displays = HashMap::new();
        for bucket in &buckets {
            for hash in &bucket.hashes {
                if let Some(candidate) = candidates.get(hash) {
                    displays.insert(
                        hash.clone(),
                        format_display(candidate, &config.result_format),
                    );
                }
            }
        }

        Aggregation {
            buckets,
            candidates,
            displays,
        }
    }
}
