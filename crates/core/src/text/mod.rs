//! Text normalization helpers.
//!
//! Static lookup tables (diacritic folding, language emoji) plus the small
//! name/language normalization rules shared by config sanitization, indexer
//! matching and result formatting.

mod emoji;
mod translate;

pub use emoji::language_emoji;
pub use translate::fold_diacritics;

/// Normalize an indexer or tracker name for case/space/underscore-insensitive
/// comparison.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace('_', " ")
}

/// Normalize a configured language value to the capitalized form used in
/// parsed candidate metadata (e.g. `"dual_audio"` -> `"Dual audio"`).
pub fn normalize_language(language: &str) -> String {
    let spaced = language.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("The_Pirate_Bay"), "the pirate bay");
        assert_eq!(normalize_name("  YTS  "), "yts");
    }

    #[test]
    fn test_normalize_language() {
        assert_eq!(normalize_language("english"), "English");
        assert_eq!(normalize_language("dual_audio"), "Dual audio");
        assert_eq!(normalize_language("FRENCH"), "French");
        assert_eq!(normalize_language(""), "");
    }
}
