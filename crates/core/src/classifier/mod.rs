//! Seam for the external title-parsing and fuzzy-matching capability.
//!
//! The engine never classifies release titles itself: resolution, language
//! tags and quality flags come from a collaborator implementing
//! [`MetadataClassifier`]. The title filter built on top of it lives in
//! [`filter`].

mod filter;

pub use filter::{filter_titles, primary_title};

use crate::candidate::QualityFlags;

/// Structured metadata extracted from a raw release title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMetadata {
    /// Clean title with release tags stripped, used for fuzzy matching.
    pub parsed_title: String,
    /// Primary resolution label ("1080p", "4K", ...), if detected.
    pub resolution: Option<String>,
    /// Capitalized language tags.
    pub languages: Vec<String>,
    pub is_multi_audio: bool,
    pub quality: QualityFlags,
}

/// External title-parsing / quality-classification / fuzzy-matching
/// capability.
pub trait MetadataClassifier: Send + Sync {
    /// Parse a raw release title into structured metadata.
    fn parse(&self, raw_title: &str) -> ParsedMetadata;

    /// Fuzzy title equivalence between the wanted title and a parsed
    /// candidate title.
    fn titles_match(&self, wanted: &str, candidate: &str) -> bool;
}
