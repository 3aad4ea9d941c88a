/// English display name for an ISO 639-1 language code.
///
/// Covers the original languages that show up in TMDB listings; anything else
/// yields `None` and the caller can fall back to the raw code.
pub fn language_name(code: &str) -> Option<&'static str> {
    let name = match code.trim().to_ascii_lowercase().as_str() {
        "ar" => "Arabic",
        "bn" => "Bengali",
        "cn" => "Cantonese",
        "cs" => "Czech",
        "da" => "Danish",
        "de" => "German",
        "el" => "Greek",
        "en" => "English",
        "es" => "Spanish",
        "et" => "Estonian",
        "fa" => "Persian",
        "fi" => "Finnish",
        "fr" => "French",
        "he" => "Hebrew",
        "hi" => "Hindi",
        "hu" => "Hungarian",
        "id" => "Indonesian",
        "is" => "Icelandic",
        "it" => "Italian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "ml" => "Malayalam",
        "ms" => "Malay",
        "nl" => "Dutch",
        "no" => "Norwegian",
        "pl" => "Polish",
        "pt" => "Portuguese",
        "ro" => "Romanian",
        "ru" => "Russian",
        "sv" => "Swedish",
        "ta" => "Tamil",
        "te" => "Telugu",
        "th" => "Thai",
        "tl" => "Tagalog",
        "tr" => "Turkish",
        "uk" => "Ukrainian",
        "vi" => "Vietnamese",
        "zh" => "Mandarin",
        _ => return None,
    };
    Some(name)
}
