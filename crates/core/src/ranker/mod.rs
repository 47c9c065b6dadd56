//! Balancer/Ranker: buckets candidates by resolution class, applies the
//! configured sort policy and language preference, then allocates a bounded
//! result budget proportionally across buckets.

mod policy;

pub use policy::SortPolicy;

use std::collections::HashSet;

use crate::candidate::CandidateSet;
use crate::config::UserConfig;
use crate::text::normalize_language;

/// Built-in bucket order used when the user configured none.
pub const DEFAULT_RESOLUTION_ORDER: [&str; 10] = [
    "4K", "2160p", "1440p", "1080p", "720p", "576p", "480p", "360p", "Uncached", "Unknown",
];

const UNKNOWN_BUCKET: &str = "Unknown";
const UNCACHED_BUCKET: &str = "Uncached";
const ALL: &str = "All";

/// One resolution bucket with its ordered candidate hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedBucket {
    pub label: String,
    pub hashes: Vec<String>,
}

/// Filter, bucket, sort and truncate the candidate set.
///
/// The returned buckets are deterministic given identical inputs: discovery
/// order seeds every ordering, and all reordering is explicit.
pub fn balance(set: &CandidateSet, config: &UserConfig) -> Vec<RankedBucket> {
    let policy = SortPolicy::parse(&config.sort_type);

    let allowed_languages: HashSet<String> =
        config.languages.iter().map(|l| normalize_language(l)).collect();
    let include_all_languages = allowed_languages.contains(ALL);
    let include_all_resolutions = config.resolutions.iter().any(|r| r == ALL);
    let include_unknown =
        include_all_resolutions || config.resolutions.iter().any(|r| r == UNKNOWN_BUCKET);
    let reclassify_uncached =
        config.resolutions_order.iter().any(|r| r == UNCACHED_BUCKET) && policy != SortPolicy::Rank;
    let max_size = u64::try_from(config.max_size).unwrap_or(0);

    // Filtering pass; buckets appear in discovery order.
    let mut buckets: Vec<RankedBucket> = Vec::new();
    for (hash, candidate) in set.iter() {
        if max_size != 0 && candidate.size_or_zero() > max_size {
            continue;
        }

        if !include_all_languages
            && !candidate.is_multi_audio
            && !candidate.languages.iter().any(|l| allowed_languages.contains(l))
        {
            continue;
        }

        let mut label = match &candidate.resolution {
            None => {
                if !include_unknown {
                    continue;
                }
                UNKNOWN_BUCKET
            }
            Some(resolution) => {
                if !include_all_resolutions && !config.resolutions.iter().any(|r| r == resolution) {
                    continue;
                }
                resolution.as_str()
            }
        };

        if reclassify_uncached && candidate.uncached {
            label = UNCACHED_BUCKET;
        }

        match buckets.iter_mut().find(|b| b.label == label) {
            Some(bucket) => bucket.hashes.push(hash.to_string()),
            None => buckets.push(RankedBucket {
                label: label.to_string(),
                hashes: vec![hash.to_string()],
            }),
        }
    }

    policy::apply(&mut buckets, set, config, policy);
    apply_language_preference(&mut buckets, set, config);

    allocate(buckets, config.max_results.max(0) as usize)
}

/// Stably partition each bucket into language-preferred candidates and the
/// rest; the preferred group is ordered by the earliest matching preference
/// and placed first.
fn apply_language_preference(buckets: &mut [RankedBucket], set: &CandidateSet, config: &UserConfig) {
    if config.language_preference.is_empty() {
        return;
    }

    let preference: Vec<String> = config
        .language_preference
        .iter()
        .map(|l| normalize_language(l))
        .collect();

    let preference_rank = |hash: &String| -> Option<usize> {
        let candidate = set.get(hash)?;
        preference
            .iter()
            .position(|preferred| candidate.languages.iter().any(|l| l == preferred))
    };

    for bucket in buckets.iter_mut() {
        let mut preferred: Vec<(usize, String)> = Vec::new();
        let mut rest: Vec<String> = Vec::new();

        for hash in bucket.hashes.drain(..) {
            match preference_rank(&hash) {
                Some(rank) => preferred.push((rank, hash)),
                None => rest.push(hash),
            }
        }

        preferred.sort_by_key(|(rank, _)| *rank); // stable: ties keep order
        bucket.hashes = preferred.into_iter().map(|(_, hash)| hash).collect();
        bucket.hashes.extend(rest);
    }
}

/// Proportionally allocate the result budget across buckets.
///
/// First pass: floor(budget / buckets) each, with the remainder spread one
/// extra over the first buckets in order. Second pass: any shortfall left by
/// under-filled buckets is drained from the remaining tails, in the same
/// bucket order.
fn allocate(buckets: Vec<RankedBucket>, budget: usize) -> Vec<RankedBucket> {
    if budget == 0 || buckets.is_empty() {
        return buckets;
    }

    let per_bucket = budget / buckets.len();
    let extras = budget % buckets.len();

    let mut allocated: Vec<RankedBucket> = buckets
        .iter()
        .enumerate()
        .map(|(position, bucket)| {
            let quota = per_bucket + usize::from(position < extras);
            RankedBucket {
                label: bucket.label.clone(),
                hashes: bucket.hashes.iter().take(quota).cloned().collect(),
            }
        })
        .collect();

    let selected: usize = allocated.iter().map(|b| b.hashes.len()).sum();
    let mut shortfall = budget.saturating_sub(selected);

    for (bucket, source) in allocated.iter_mut().zip(buckets.iter()) {
        if shortfall == 0 {
            break;
        }
        let taken = bucket.hashes.len();
        let tail: Vec<String> = source
            .hashes
            .iter()
            .skip(taken)
            .take(shortfall)
            .cloned()
            .collect();
        shortfall -= tail.len();
        bucket.hashes.extend(tail);
    }

    allocated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{Candidate, QualityFlags};

    fn candidate(resolution: Option<&str>, seeders: Option<u32>, size: Option<u64>) -> Candidate {
        Candidate {
            title: "t".to_string(),
            size,
            seeders,
            tracker: None,
            link: None,
            resolution: resolution.map(|r| r.to_string()),
            languages: Vec::new(),
            is_multi_audio: false,
            uncached: false,
            quality: QualityFlags::default(),
            index: None,
        }
    }

    fn config_json(extra: &str) -> UserConfig {
        let json = format!(
            r#"{{"debridService": "realdebrid", "debridApiKey": "k"{}}}"#,
            extra
        );
        serde_json::from_str(&json).unwrap()
    }

    fn populate(set: &mut CandidateSet, resolution: &str, count: usize) {
        for i in 0..count {
            set.insert(
                &format!("{resolution}{i:04}"),
                candidate(Some(resolution), Some(i as u32), Some(1000)),
            );
        }
    }

    #[test]
    fn test_balanced_allocation_even_split() {
        let mut set = CandidateSet::new();
        populate(&mut set, "1080p", 7);
        populate(&mut set, "720p", 7);

        let config = config_json(r#", "maxResults": 10"#);
        let buckets = balance(&set, &config);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].hashes.len(), 5);
        assert_eq!(buckets[1].hashes.len(), 5);
    }

    #[test]
    fn test_balanced_allocation_shortfall_second_pass() {
        // Budget 10 over {1080p: 3, 720p: 7}: quotas are 5/5, the 1080p
        // shortfall of 2 is pulled from 720p's tail.
        let mut set = CandidateSet::new();
        populate(&mut set, "1080p", 3);
        populate(&mut set, "720p", 7);

        let config = config_json(r#", "maxResults": 10"#);
        let buckets = balance(&set, &config);

        assert_eq!(buckets[0].hashes.len(), 3);
        assert_eq!(buckets[1].hashes.len(), 7);
        let total: usize = buckets.iter().map(|b| b.hashes.len()).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_allocation_remainder_goes_to_first_buckets() {
        let mut set = CandidateSet::new();
        populate(&mut set, "4K", 5);
        populate(&mut set, "1080p", 5);
        populate(&mut set, "720p", 5);

        let config = config_json(r#", "maxResults": 8"#);
        let buckets = balance(&set, &config);

        // floor(8/3)=2, remainder 2: first two buckets get 3, last gets 2.
        assert_eq!(buckets[0].hashes.len(), 3);
        assert_eq!(buckets[1].hashes.len(), 3);
        assert_eq!(buckets[2].hashes.len(), 2);
    }

    #[test]
    fn test_total_is_min_of_budget_and_available() {
        let mut set = CandidateSet::new();
        populate(&mut set, "1080p", 2);
        populate(&mut set, "720p", 1);

        let config = config_json(r#", "maxResults": 100"#);
        let buckets = balance(&set, &config);
        let total: usize = buckets.iter().map(|b| b.hashes.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_zero_budget_returns_everything() {
        let mut set = CandidateSet::new();
        populate(&mut set, "1080p", 4);

        let config = config_json("");
        let buckets = balance(&set, &config);
        assert_eq!(buckets[0].hashes.len(), 4);
    }

    #[test]
    fn test_rank_policy_preserves_discovery_order() {
        let mut set = CandidateSet::new();
        set.insert("b1", candidate(Some("720p"), Some(1), None));
        set.insert("a1", candidate(Some("1080p"), Some(9), None));
        set.insert("b2", candidate(Some("720p"), Some(50), None));

        let config = config_json("");
        let buckets = balance(&set, &config);

        // Buckets in discovery order, internal order untouched.
        assert_eq!(buckets[0].label, "720p");
        assert_eq!(buckets[0].hashes, vec!["b1", "b2"]);
        assert_eq!(buckets[1].label, "1080p");
    }

    #[test]
    fn test_bogus_sort_type_falls_back_to_rank() {
        let mut set = CandidateSet::new();
        set.insert("b1", candidate(Some("720p"), Some(1), None));
        set.insert("a1", candidate(Some("1080p"), Some(9), None));

        let config = config_json(r#", "sortType": "Bogus""#);
        let buckets = balance(&set, &config);

        assert_eq!(buckets[0].label, "720p");
        assert_eq!(buckets[1].label, "1080p");
    }

    #[test]
    fn test_resolution_policy_orders_buckets() {
        let mut set = CandidateSet::new();
        set.insert("c1", candidate(Some("480p"), Some(1), None));
        set.insert("a1", candidate(Some("1080p"), Some(1), None));
        set.insert("d1", candidate(Some("4K"), Some(1), None));

        let config = config_json(r#", "sortType": "Sort_by_Resolution""#);
        let buckets = balance(&set, &config);

        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["4K", "1080p", "480p"]);
    }

    #[test]
    fn test_unlisted_buckets_sort_last_in_encounter_order() {
        let mut set = CandidateSet::new();
        set.insert("w1", candidate(Some("Weird"), Some(1), None));
        set.insert("a1", candidate(Some("1080p"), Some(1), None));
        set.insert("o1", candidate(Some("Odd"), Some(1), None));

        let config = config_json(r#", "sortType": "Sort_by_Resolution""#);
        let buckets = balance(&set, &config);

        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["1080p", "Weird", "Odd"]);
    }

    #[test]
    fn test_seeders_policy_sorts_within_buckets() {
        let mut set = CandidateSet::new();
        set.insert("a1", candidate(Some("1080p"), Some(3), None));
        set.insert("a2", candidate(Some("1080p"), None, None)); // unknown -> 0
        set.insert("a3", candidate(Some("1080p"), Some(90), None));

        let config = config_json(r#", "sortType": "Sort_by_Resolution_then_Seeders""#);
        let buckets = balance(&set, &config);

        assert_eq!(buckets[0].hashes, vec!["a3", "a1", "a2"]);
        let seeders: Vec<u32> = buckets[0]
            .hashes
            .iter()
            .map(|h| set.get(h).unwrap().seeders_or_zero())
            .collect();
        assert!(seeders.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_size_policy_sorts_within_buckets() {
        let mut set = CandidateSet::new();
        set.insert("a1", candidate(Some("1080p"), Some(1), Some(500)));
        set.insert("a2", candidate(Some("1080p"), Some(1), None)); // unknown -> 0
        set.insert("a3", candidate(Some("1080p"), Some(1), Some(9000)));

        let config = config_json(r#", "sortType": "Sort_by_Resolution_then_Size""#);
        let buckets = balance(&set, &config);

        assert_eq!(buckets[0].hashes, vec!["a3", "a1", "a2"]);
    }

    #[test]
    fn test_uncached_reclassification_and_seeder_order() {
        let mut set = CandidateSet::new();
        let mut fast = candidate(Some("1080p"), Some(80), None);
        fast.uncached = true;
        let mut slow = candidate(Some("4K"), Some(2), None);
        slow.uncached = true;
        set.insert("u-slow", slow);
        set.insert("u-fast", fast);
        set.insert("c1", candidate(Some("1080p"), Some(5), None));

        let config = config_json(
            r#", "sortType": "Sort_by_Resolution",
                "resolutionsOrder": ["1080p", "Uncached"]"#,
        );
        let buckets = balance(&set, &config);

        assert_eq!(buckets[0].label, "1080p");
        assert_eq!(buckets[0].hashes, vec!["c1"]);
        assert_eq!(buckets[1].label, "Uncached");
        assert_eq!(buckets[1].hashes, vec!["u-fast", "u-slow"]);
    }

    #[test]
    fn test_uncached_not_reclassified_under_rank() {
        let mut set = CandidateSet::new();
        let mut uncached = candidate(Some("1080p"), Some(1), None);
        uncached.uncached = true;
        set.insert("u1", uncached);

        let config = config_json(r#", "resolutionsOrder": ["1080p", "Uncached"]"#);
        let buckets = balance(&set, &config);
        assert_eq!(buckets[0].label, "1080p");
    }

    #[test]
    fn test_max_size_filter() {
        let mut set = CandidateSet::new();
        set.insert("big1", candidate(Some("1080p"), Some(1), Some(5000)));
        set.insert("ok1", candidate(Some("1080p"), Some(1), Some(100)));
        set.insert("unk1", candidate(Some("1080p"), Some(1), None)); // unknown size kept

        let config = config_json(r#", "maxSize": 1000"#);
        let buckets = balance(&set, &config);
        assert_eq!(buckets[0].hashes, vec!["ok1", "unk1"]);
    }

    #[test]
    fn test_language_filter() {
        let mut set = CandidateSet::new();
        let mut french = candidate(Some("1080p"), Some(1), None);
        french.languages = vec!["French".to_string()];
        let mut multi = candidate(Some("1080p"), Some(1), None);
        multi.is_multi_audio = true;
        let english = {
            let mut c = candidate(Some("1080p"), Some(1), None);
            c.languages = vec!["English".to_string()];
            c
        };
        set.insert("fr", french);
        set.insert("multi", multi);
        set.insert("en", english);

        let config = config_json(r#", "languages": ["french"]"#);
        let buckets = balance(&set, &config);

        // Multi-audio always passes the language filter.
        assert_eq!(buckets[0].hashes, vec!["fr", "multi"]);
    }

    #[test]
    fn test_unknown_resolution_bucket() {
        let mut set = CandidateSet::new();
        set.insert("u1", candidate(None, Some(1), None));
        set.insert("a1", candidate(Some("1080p"), Some(1), None));

        let all = config_json("");
        let buckets = balance(&set, &all);
        assert!(buckets.iter().any(|b| b.label == "Unknown"));

        let strict = config_json(r#", "resolutions": ["1080p"]"#);
        let buckets = balance(&set, &strict);
        assert!(!buckets.iter().any(|b| b.label == "Unknown"));

        let with_unknown = config_json(r#", "resolutions": ["Unknown"]"#);
        let buckets = balance(&set, &with_unknown);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "Unknown");
    }

    #[test]
    fn test_language_preference_reordering_is_stable() {
        let mut set = CandidateSet::new();
        for (hash, langs) in [
            ("h1", vec!["English"]),
            ("h2", vec!["German"]),
            ("h3", vec!["French"]),
            ("h4", vec!["Spanish"]),
            ("h5", vec!["French", "English"]),
        ] {
            let mut c = candidate(Some("1080p"), Some(1), None);
            c.languages = langs.into_iter().map(String::from).collect();
            set.insert(hash, c);
        }

        let config = config_json(r#", "languagePreference": ["french", "english"]"#);
        let buckets = balance(&set, &config);

        // Preferred (french first, then english) ahead of the rest; ties
        // and the non-preferred group keep their relative order.
        assert_eq!(buckets[0].hashes, vec!["h3", "h5", "h1", "h2", "h4"]);
    }
}
