//! Sort policies and their application to ranked buckets.

use tracing::warn;

use crate::candidate::CandidateSet;
use crate::config::UserConfig;

use super::{RankedBucket, DEFAULT_RESOLUTION_ORDER, UNCACHED_BUCKET};

/// How buckets and their contents are ordered before allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPolicy {
    /// Discovery order throughout; no reordering.
    Rank,
    /// Buckets ordered by resolution class; contents untouched.
    Resolution,
    /// Buckets by resolution class, contents by seeders descending.
    ResolutionThenSeeders,
    /// Buckets by resolution class, contents by size descending.
    ResolutionThenSize,
}

impl SortPolicy {
    /// Parse the wire-format policy name; unknown names fall back to
    /// [`SortPolicy::Rank`] with a warning.
    pub fn parse(name: &str) -> SortPolicy {
        match name {
            "Sort_by_Rank" => SortPolicy::Rank,
            "Sort_by_Resolution" => SortPolicy::Resolution,
            "Sort_by_Resolution_then_Seeders" => SortPolicy::ResolutionThenSeeders,
            "Sort_by_Resolution_then_Size" => SortPolicy::ResolutionThenSize,
            other => {
                warn!(sort_type = %other, "Unknown sort policy, using Sort_by_Rank");
                SortPolicy::Rank
            }
        }
    }
}

/// Reorder buckets and their contents according to the policy. Rank leaves
/// everything in discovery order.
pub fn apply(
    buckets: &mut Vec<RankedBucket>,
    set: &CandidateSet,
    config: &UserConfig,
    policy: SortPolicy,
) {
    if policy == SortPolicy::Rank {
        return;
    }

    let order: Vec<&str> = if config.resolutions_order.is_empty() {
        DEFAULT_RESOLUTION_ORDER.to_vec()
    } else {
        config.resolutions_order.iter().map(|s| s.as_str()).collect()
    };

    // Unlisted labels rank after every listed one, keeping encounter order.
    let position =
        |label: &str| order.iter().position(|o| *o == label).unwrap_or(order.len());
    buckets.sort_by_key(|bucket| position(&bucket.label));

    let seeders = |hash: &String| set.get(hash).map(|c| c.seeders_or_zero()).unwrap_or(0);
    let size = |hash: &String| set.get(hash).map(|c| c.size_or_zero()).unwrap_or(0);

    for bucket in buckets.iter_mut() {
        if bucket.label == UNCACHED_BUCKET {
            // Uncached availability depends on swarm health, so this bucket
            // is always ordered by seeders regardless of policy.
            bucket.hashes.sort_by(|a, b| seeders(b).cmp(&seeders(a)));
            continue;
        }
        match policy {
            SortPolicy::Rank | SortPolicy::Resolution => {}
            SortPolicy::ResolutionThenSeeders => {
                bucket.hashes.sort_by(|a, b| seeders(b).cmp(&seeders(a)));
            }
            SortPolicy::ResolutionThenSize => {
                bucket.hashes.sort_by(|a, b| size(b).cmp(&size(a)));
            }
        }
    }
}
