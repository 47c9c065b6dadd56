//! Title filter: rejects scraped results whose title does not match the
//! queried media.

use super::MetadataClassifier;
use crate::text::fold_diacritics;

/// Extract the primary title line from a possibly multi-line source title.
///
/// Two source conventions embed secondary metadata after a line break:
/// - `"Name\n👤 ..."` puts seeder/tracker decorations after the 👤 marker;
///   the segment before it is the title.
/// - `"Torrent Name\nFile Name"` (fallback-source convention) carries the
///   contained file name on the second line; that line identifies the
///   playable content, so it wins.
///
/// Anything else is returned unmodified rather than guessing a split point.
pub fn primary_title(raw: &str) -> &str {
    if let Some((head, _)) = raw.split_once("\n👤") {
        return head;
    }
    if let Some((_, tail)) = raw.split_once('\n') {
        return tail.split('\n').next().unwrap_or(raw);
    }
    raw
}

/// Decide, per candidate title, whether it matches the wanted title.
///
/// Both sides are diacritic-folded before the external fuzzy matcher is
/// consulted against the externally parsed primary title. Input order is
/// preserved in the output.
pub fn filter_titles<C>(titles: &[(usize, String)], wanted: &str, classifier: &C) -> Vec<(usize, bool)>
where
    C: MetadataClassifier + ?Sized,
{
    let wanted = fold_diacritics(wanted);

    titles
        .iter()
        .map(|(index, title)| {
            let primary = fold_diacritics(primary_title(title));
            let parsed = classifier.parse(&primary);
            (*index, classifier.titles_match(&wanted, &parsed.parsed_title))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ParsedMetadata;

    /// Matcher that strips everything after the first dot-separated word
    /// run and compares case-insensitively. Stands in for the external
    /// capability.
    struct PrefixClassifier;

    impl MetadataClassifier for PrefixClassifier {
        fn parse(&self, raw_title: &str) -> ParsedMetadata {
            ParsedMetadata {
                parsed_title: raw_title.replace('.', " "),
                ..ParsedMetadata::default()
            }
        }

        fn titles_match(&self, wanted: &str, candidate: &str) -> bool {
            candidate.to_lowercase().starts_with(&wanted.to_lowercase())
        }
    }

    #[test]
    fn test_primary_title_single_line() {
        assert_eq!(primary_title("Movie.Name.2023.1080p"), "Movie.Name.2023.1080p");
    }

    #[test]
    fn test_primary_title_uploader_marker() {
        assert_eq!(
            primary_title("Movie.Name.2023\n👤 42 💾 2.1 GB ⚙️ TrackerX"),
            "Movie.Name.2023"
        );
    }

    #[test]
    fn test_primary_title_second_line_convention() {
        // Fallback-source shape: torrent name, then file name.
        assert_eq!(
            primary_title("Show S01\nShow.S01E01.1080p.mkv"),
            "Show.S01E01.1080p.mkv"
        );
    }

    #[test]
    fn test_primary_title_second_line_only() {
        // Further lines beyond the second are metadata, not title.
        assert_eq!(
            primary_title("Movie.Name\n👤 uploader\n⚙️ TrackerX\nextra"),
            "Movie.Name"
        );
        assert_eq!(primary_title("First\nSecond\nThird"), "Second");
    }

    #[test]
    fn test_filter_preserves_order_and_indices() {
        let titles = vec![
            (0, "Movie Name 2023 1080p".to_string()),
            (3, "Other.Film.720p".to_string()),
            (1, "Movie.Name.2160p".to_string()),
        ];

        let results = filter_titles(&titles, "Movie Name", &PrefixClassifier);
        assert_eq!(results, vec![(0, true), (3, false), (1, true)]);
    }

    #[test]
    fn test_filter_folds_diacritics() {
        let titles = vec![(0, "Amélie 2001 1080p".to_string())];
        let results = filter_titles(&titles, "Amelie", &PrefixClassifier);
        assert_eq!(results, vec![(0, true)]);
    }

    #[test]
    fn test_filter_uses_primary_title_line() {
        let titles = vec![(0, "Garbage Prefix\nMovie.Name.2023.1080p".to_string())];
        let results = filter_titles(&titles, "Movie Name", &PrefixClassifier);
        assert_eq!(results, vec![(0, true)]);
    }
}
