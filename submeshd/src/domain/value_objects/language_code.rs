//! Two-letter ISO 639-1 language codes and normalisation from the
//! catalogue's 3-letter codes, via a static code/name table.

/// `(ISO 639-2/B 3-letter code, ISO 639-1 2-letter code)`.
const THREE_TO_TWO: &[(&str, &str)] = &[
    ("eng", "en"),
    ("spa", "es"),
    ("fre", "fr"),
    ("fra", "fr"),
    ("ger", "de"),
    ("deu", "de"),
    ("ita", "it"),
    ("por", "pt"),
    ("rus", "ru"),
    ("jpn", "ja"),
    ("chi", "zh"),
    ("zho", "zh"),
    ("kor", "ko"),
    ("ara", "ar"),
    ("heb", "he"),
    ("hin", "hi"),
    ("dut", "nl"),
    ("nld", "nl"),
    ("swe", "sv"),
    ("nor", "no"),
    ("dan", "da"),
    ("fin", "fi"),
    ("pol", "pl"),
    ("tur", "tr"),
    ("gre", "el"),
    ("ell", "el"),
    ("cze", "cs"),
    ("ces", "cs"),
    ("hun", "hu"),
    ("rum", "ro"),
    ("ron", "ro"),
    ("ukr", "uk"),
    ("vie", "vi"),
    ("tha", "th"),
    ("ind", "id"),
];

/// Returns true if `s` is exactly two lowercase ASCII letters, the
/// ingress requirement for `language`/`target_language` everywhere.
pub fn is_valid_two_letter(s: &str) -> bool {
    s.len() == 2 && s.chars().all(|c| c.is_ascii_lowercase())
}

/// Normalises a catalogue language code to 2-letter ISO 639-1. Unknown
/// 3-letter codes fall back to their first two letters (with a caller-side
/// warning expected), per §4.4.
pub fn normalize_to_iso639_1(code: &str) -> String {
    let lower = code.to_ascii_lowercase();
    if is_valid_two_letter(&lower) {
        return lower;
    }
    if let Some((_, two)) = THREE_TO_TWO.iter().find(|(three, _)| *three == lower) {
        return (*two).to_string();
    }
    tracing::warn!(code = %code, "unknown language code, falling back to first two letters");
    lower.chars().take(2).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_known_two_letter_codes() {
        assert_eq!(normalize_to_iso639_1("en"), "en");
        assert_eq!(normalize_to_iso639_1("he"), "he");
    }

    #[test]
    fn maps_three_letter_codes() {
        assert_eq!(normalize_to_iso639_1("eng"), "en");
        assert_eq!(normalize_to_iso639_1("heb"), "he");
        assert_eq!(normalize_to_iso639_1("FRE"), "fr");
    }

    #[test]
    fn falls_back_to_first_two_letters_for_unknown_codes() {
        assert_eq!(normalize_to_iso639_1("xyz"), "xy");
    }

    #[test]
    fn validates_two_letter_shape() {
        assert!(is_valid_two_letter("en"));
        assert!(!is_valid_two_letter("eng"));
        assert!(!is_valid_two_letter("EN"));
        assert!(!is_valid_two_letter(""));
    }
}
