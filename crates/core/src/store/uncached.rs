//! Promotion of uncached candidates into the result map.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{info, warn};

use crate::candidate::{Candidate, CandidateSet, QualityFlags};
use crate::scraper::RawResult;
use crate::text::normalize_name;

use super::{TorrentStore, UncachedRecord};

/// Merge raw results from allow-listed trackers into the candidate set as
/// uncached candidates, and persist them for later availability checks.
///
/// Selection: a raw result qualifies when its tracker identifier
/// (lower-cased) is allow-listed and its hash is not already a key in the
/// set. Selected candidates get strictly increasing display indices, are
/// sorted by seeders descending, capped at `max_uncached` (0 = unbounded),
/// then merged and batch-upserted. A failed batch write is logged; the
/// in-memory merge stands regardless.
pub fn merge_uncached(
    set: &mut CandidateSet,
    raw_results: &[RawResult],
    cache_key: &[u8],
    allowed_tracker_ids: &[String],
    max_uncached: usize,
    store: &dyn TorrentStore,
) {
    let allowed: HashSet<String> = allowed_tracker_ids.iter().map(|t| normalize_name(t)).collect();
    if allowed.is_empty() {
        return;
    }

    let mut next_index = set.next_index();
    let mut seen: HashSet<String> = HashSet::new();
    let mut selected: Vec<(String, Candidate)> = Vec::new();

    for raw in raw_results {
        if !allowed.contains(&normalize_name(raw.allow_key())) {
            continue;
        }
        let Some(hash) = &raw.info_hash else {
            continue;
        };
        let hash = hash.to_lowercase();
        if set.contains(&hash) || !seen.insert(hash.clone()) {
            continue;
        }

        let candidate = Candidate {
            title: raw.title.clone(),
            size: raw.size,
            seeders: Some(raw.seeders.unwrap_or(0)),
            tracker: Some(raw.tracker.clone()),
            link: raw.link.clone(),
            resolution: None,
            languages: Vec::new(),
            is_multi_audio: false,
            uncached: true,
            quality: QualityFlags::default(),
            index: Some(next_index),
        };
        next_index += 1;
        selected.push((hash, candidate));
    }

    // Stable, so equal seeder counts keep their discovery order.
    selected.sort_by(|a, b| b.1.seeders_or_zero().cmp(&a.1.seeders_or_zero()));
    if max_uncached > 0 {
        selected.truncate(max_uncached);
    }

    let timestamp = Utc::now().timestamp();
    let mut records = Vec::with_capacity(selected.len());
    let mut merged = 0usize;

    for (hash, candidate) in selected {
        let data = match serde_json::to_string(&candidate) {
            Ok(data) => data,
            Err(e) => {
                warn!(hash = %hash, error = %e, "Failed to serialize uncached candidate");
                continue;
            }
        };
        if set.insert(&hash, candidate) {
            merged += 1;
            records.push(UncachedRecord {
                hash,
                torrent_id: String::new(),
                data,
                cache_key: cache_key.to_vec(),
                timestamp,
            });
        }
    }

    if !records.is_empty() {
        if let Err(e) = store.upsert_uncached(&records) {
            warn!(error = %e, "Failed to persist uncached candidates, keeping in-memory merge");
        }
    }

    info!(count = merged, trackers = ?allowed_tracker_ids, "Uncached candidates merged");
}
