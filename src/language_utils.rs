//! Language utilities for ISO language code handling
//!
//! Wikipedia language codes are mostly ISO 639-1 or 639-3, but not all
//! of them ("simple", "zh-yue", "be-tarask"). Nothing here rejects a code;
//! these helpers only feed diagnostics.

use isolang::Language;

/// Look up an ISO 639-1 (2-letter) or ISO 639-3 (3-letter) code
pub fn lookup(code: &str) -> Option<Language> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => Language::from_639_3(&normalized_code),
        _ => None,
    }
}

/// Check whether a code is a known ISO 639 code
pub fn is_iso_code(code: &str) -> bool {
    lookup(code).is_some()
}

/// Get the English language name for a code, if it is an ISO code
pub fn get_language_name(code: &str) -> Option<String> {
    lookup(code).map(|lang| lang.to_name().to_string())
}
