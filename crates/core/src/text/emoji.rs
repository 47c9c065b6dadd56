//! Language to emoji lookup for formatted results.

use std::collections::HashMap;

use once_cell::sync::Lazy;

static LANGUAGE_EMOJIS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("multi_subs", "🌐"),
        ("multi_audio", "🌎"),
        ("dual_audio", "🔉"),
        ("english", "🇬🇧"),
        ("japanese", "🇯🇵"),
        ("korean", "🇰🇷"),
        ("taiwanese", "🇹🇼"),
        ("chinese", "🇨🇳"),
        ("french", "🇫🇷"),
        ("latino", "💃🏻"),
        ("spanish", "🇪🇸"),
        ("portuguese", "🇵🇹"),
        ("italian", "🇮🇹"),
        ("greek", "🇬🇷"),
        ("german", "🇩🇪"),
        ("russian", "🇷🇺"),
        ("ukrainian", "🇺🇦"),
        ("hindi", "🇮🇳"),
        ("telugu", "🇮🇳"),
        ("tamil", "🇮🇳"),
        ("lithuanian", "🇱🇹"),
        ("latvian", "🇱🇻"),
        ("estonian", "🇪🇪"),
        ("polish", "🇵🇱"),
        ("czech", "🇨🇿"),
        ("slovakian", "🇸🇰"),
        ("hungarian", "🇭🇺"),
        ("romanian", "🇷🇴"),
        ("bulgarian", "🇧🇬"),
        ("serbian", "🇷🇸"),
        ("croatian", "🇭🇷"),
        ("slovenian", "🇸🇮"),
        ("dutch", "🇳🇱"),
        ("danish", "🇩🇰"),
        ("finnish", "🇫🇮"),
        ("swedish", "🇸🇪"),
        ("norwegian", "🇳🇴"),
        ("arabic", "🇸🇦"),
        ("turkish", "🇹🇷"),
        ("vietnamese", "🇻🇳"),
        ("indonesian", "🇮🇩"),
        ("thai", "🇹🇭"),
        ("malay", "🇲🇾"),
        ("hebrew", "🇮🇱"),
        ("persian", "🇮🇷"),
        ("bengali", "🇧🇩"),
    ])
});

/// Look up the emoji for a language, falling back to the raw string when the
/// language is not in the table.
pub fn language_emoji(language: &str) -> String {
    let key = language.replace(' ', "_").to_lowercase();
    match LANGUAGE_EMOJIS.get(key.as_str()) {
        Some(emoji) => (*emoji).to_string(),
        None => language.to_string(),
    }
}
