//! Candidate data model.
//!
//! A `Candidate` is one torrent surfaced by the scrapers, keyed by its
//! 40-hex info hash inside a `CandidateSet`. The set preserves insertion
//! order (the upstream rank) and assigns each candidate a display index
//! that is never reused within the set.

use std::collections::HashMap;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Quality flags extracted from the release title by the metadata classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityFlags {
    /// HDR kind as reported by the classifier (e.g. "HDR10", "DV").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdr: Option<String>,
    #[serde(default)]
    pub remux: bool,
    #[serde(default)]
    pub proper: bool,
    #[serde(default)]
    pub repack: bool,
    #[serde(default)]
    pub upscaled: bool,
    #[serde(default)]
    pub remastered: bool,
    #[serde(default)]
    pub directors_cut: bool,
    #[serde(default)]
    pub extended: bool,
}

/// A single aggregated torrent result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Raw release title as reported by the source.
    pub title: String,
    /// Size in bytes, when the source reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Seeder count, `None` when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeders: Option<u32>,
    /// Source/tracker label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker: Option<String>,
    /// .torrent download link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Primary resolution label ("1080p", "4K", ...), absent when the
    /// classifier could not determine one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Language tags, capitalized ("English", "Dual audio").
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub is_multi_audio: bool,
    /// Known upstream but not yet confirmed retrievable by the debrid
    /// collaborator.
    #[serde(default)]
    pub uncached: bool,
    #[serde(default)]
    pub quality: QualityFlags,
    /// Sequential display index, assigned by the owning `CandidateSet`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl Candidate {
    /// Seeders with the unknown marker treated as zero (sorting rule).
    pub fn seeders_or_zero(&self) -> u32 {
        self.seeders.unwrap_or(0)
    }

    /// Size with unknown treated as zero (sorting rule).
    pub fn size_or_zero(&self) -> u64 {
        self.size.unwrap_or(0)
    }
}

/// Insertion-ordered map of info hash -> `Candidate`.
///
/// The info hash is the deduplication key: inserting an already-present hash
/// keeps the existing candidate. Display indices grow monotonically and are
/// never reused, even after removals.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    order: Vec<String>,
    by_hash: HashMap<String, Candidate>,
    next_index: u32,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            by_hash: HashMap::new(),
            next_index: 1,
        }
    }

    /// The display index the next inserted candidate would receive.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Insert a candidate keyed by its info hash (lower-cased).
    ///
    /// Returns `false` without modifying the set when the hash is already
    /// present. A candidate arriving without an index is assigned the next
    /// one; a pre-assigned index bumps the counter past it.
    pub fn insert(&mut self, hash: &str, mut candidate: Candidate) -> bool {
        let hash = hash.to_lowercase();
        if self.by_hash.contains_key(&hash) {
            return false;
        }

        let index = match candidate.index {
            Some(index) => index,
            None => self.next_index,
        };
        candidate.index = Some(index);
        self.next_index = self.next_index.max(index + 1);

        self.order.push(hash.clone());
        self.by_hash.insert(hash, candidate);
        true
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.by_hash.contains_key(&hash.to_lowercase())
    }

    pub fn get(&self, hash: &str) -> Option<&Candidate> {
        self.by_hash.get(&hash.to_lowercase())
    }

    pub fn remove(&mut self, hash: &str) -> Option<Candidate> {
        let hash = hash.to_lowercase();
        let removed = self.by_hash.remove(&hash);
        if removed.is_some() {
            self.order.retain(|h| h != &hash);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate hash/candidate pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Candidate)> {
        self.order
            .iter()
            .filter_map(|hash| self.by_hash.get(hash).map(|c| (hash.as_str(), c)))
    }
}

// Serialized as a JSON object keyed by hash; document order carries the
// insertion order through a cache round trip.
impl Serialize for CandidateSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (hash, candidate) in self.iter() {
            map.serialize_entry(hash, candidate)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CandidateSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = CandidateSet;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of info hash to candidate")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut set = CandidateSet::new();
                while let Some((hash, candidate)) = access.next_entry::<String, Candidate>()? {
                    set.insert(&hash, candidate);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}
