//! Presentation formatting for ranked candidates.
//!
//! Produces the multi-line display string shown for each candidate, driven
//! by the user's `resultFormat` selection.

use crate::candidate::{Candidate, QualityFlags};
use crate::text::language_emoji;

const ALL: &str = "All";

/// Render a byte count with binary-1024 units, rounded to two decimals.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Byte".to_string();
    }

    if bytes < 1024 {
        return format!("{bytes} Bytes");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{:.1} {}", rounded, UNITS[unit])
    } else {
        format!("{} {}", rounded, UNITS[unit])
    }
}

/// Join quality markers into a " | "-separated line; empty when none apply.
pub fn format_metadata(quality: &QualityFlags) -> String {
    let mut extras: Vec<&str> = Vec::new();
    if let Some(hdr) = &quality.hdr {
        extras.push(if hdr == "DV" { "Dolby Vision" } else { hdr });
    }
    if quality.remux {
        extras.push("Remux");
    }
    if quality.proper {
        extras.push("Proper");
    }
    if quality.repack {
        extras.push("Repack");
    }
    if quality.upscaled {
        extras.push("Upscaled");
    }
    if quality.remastered {
        extras.push("Remastered");
    }
    if quality.directors_cut {
        extras.push("Director's Cut");
    }
    if quality.extended {
        extras.push("Extended");
    }
    extras.join(" | ")
}

/// Build the display string for a candidate.
///
/// `result_format` lists the selected sections; "All" selects every one.
/// Uncached candidates surface their seeder count even when the Seeders
/// section is not selected, since swarm health decides whether they are
/// worth requesting.
pub fn format_display(candidate: &Candidate, result_format: &[String]) -> String {
    let selected =
        |section: &str| result_format.iter().any(|s| s == section || s == ALL);

    let mut display = String::new();

    if selected("Title") {
        display.push_str(&candidate.title);
        display.push('\n');
    }

    if selected("Metadata") {
        let metadata = format_metadata(&candidate.quality);
        if !metadata.is_empty() {
            display.push_str(&format!("💿 {metadata}\n"));
        }
    }

    if selected("Size") {
        display.push_str(&format!("💾 {} ", human_size(candidate.size_or_zero())));
    }

    if selected("Tracker") {
        let tracker = candidate.tracker.as_deref().unwrap_or("?");
        display.push_str(&format!("🔎 {tracker}"));
    }

    if selected("Uncached") && candidate.uncached {
        display.push_str("\n⚠️ Uncached");
    }

    if (selected("Seeders") || candidate.uncached) && candidate.seeders.is_some() {
        display.push_str(&format!("🌱 {} Seeders", candidate.seeders_or_zero()));
    }

    if selected("Languages") {
        let line = if !candidate.languages.is_empty() {
            Some(
                candidate
                    .languages
                    .iter()
                    .map(|l| language_emoji(l))
                    .collect::<Vec<_>>()
                    .join("/"),
            )
        } else if candidate.is_multi_audio {
            Some(language_emoji("multi_audio"))
        } else {
            None
        };
        if let Some(line) = line {
            display.push('\n');
            display.push_str(&line);
        }
    }

    if display.is_empty() {
        // Without a body the player UI falls back to a bare quality label,
        // which reads like a broken result.
        display = "Empty result format configuration".to_string();
    }

    display
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Candidate {
        Candidate {
            title: "Movie.2024.1080p.WEB-DL".to_string(),
            size: Some(2_147_483_648), // 2 GB
            seeders: Some(42),
            tracker: Some("YTS".to_string()),
            link: None,
            resolution: Some("1080p".to_string()),
            languages: vec!["French".to_string(), "English".to_string()],
            is_multi_audio: false,
            uncached: false,
            quality: QualityFlags::default(),
            index: Some(1),
        }
    }

    fn all() -> Vec<String> {
        vec!["All".to_string()]
    }

    fn sections(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 Byte");
        assert_eq!(human_size(512), "512 Bytes");
        assert_eq!(human_size(1024), "1.0 KB");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(2_147_483_648), "2.0 GB");
        assert_eq!(human_size(1_288_490_189), "1.2 GB");
        assert_eq!(human_size(5_497_558_138_880), "5.0 TB");
    }

    #[test]
    fn test_format_metadata_markers() {
        let mut quality = QualityFlags::default();
        assert_eq!(format_metadata(&quality), "");

        quality.hdr = Some("HDR10".to_string());
        quality.remux = true;
        quality.extended = true;
        assert_eq!(format_metadata(&quality), "HDR10 | Remux | Extended");

        quality.hdr = Some("DV".to_string());
        assert!(format_metadata(&quality).starts_with("Dolby Vision"));
    }

    #[test]
    fn test_full_display() {
        let display = format_display(&candidate(), &all());
        assert_eq!(
            display,
            "Movie.2024.1080p.WEB-DL\n💾 2.0 GB 🔎 YTS🌱 42 Seeders\n🇫🇷/🇬🇧"
        );
    }

    #[test]
    fn test_selected_sections_only() {
        let display = format_display(&candidate(), &sections(&["Title", "Tracker"]));
        assert_eq!(display, "Movie.2024.1080p.WEB-DL\n🔎 YTS");
    }

    #[test]
    fn test_missing_tracker_renders_placeholder() {
        let mut c = candidate();
        c.tracker = None;
        let display = format_display(&c, &sections(&["Tracker"]));
        assert_eq!(display, "🔎 ?");
    }

    #[test]
    fn test_uncached_banner_and_seeders() {
        let mut c = candidate();
        c.uncached = true;

        let display = format_display(&c, &sections(&["Tracker", "Uncached"]));
        assert_eq!(display, "🔎 YTS\n⚠️ Uncached🌱 42 Seeders");

        // Uncached forces the seeder count even when Seeders is unselected.
        let display = format_display(&c, &sections(&["Title"]));
        assert!(display.contains("🌱 42 Seeders"));

        c.seeders = None;
        let display = format_display(&c, &sections(&["Title"]));
        assert!(!display.contains("Seeders"));
    }

    #[test]
    fn test_multi_audio_fallback_emoji() {
        let mut c = candidate();
        c.languages.clear();
        c.is_multi_audio = true;
        let display = format_display(&c, &sections(&["Languages"]));
        assert_eq!(display, "\n🌎");
    }

    #[test]
    fn test_no_language_line_when_unknown() {
        let mut c = candidate();
        c.languages.clear();
        let display = format_display(&c, &sections(&["Languages"]));
        assert_eq!(display, "Empty result format configuration");
    }

    #[test]
    fn test_empty_selection_placeholder() {
        let display = format_display(&candidate(), &[]);
        assert_eq!(display, "Empty result format configuration");
    }
}
