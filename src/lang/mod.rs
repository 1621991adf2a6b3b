//! Best-effort language detection
//!
//! Wraps `whatlang` behind a total function: blank input, detection failure,
//! and low-confidence results all collapse to the `"unknown"` sentinel, and
//! nothing ever propagates past this boundary.

use tracing::trace;

/// Sentinel returned when no language can be determined
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Detect the language of canonical text, returning an ISO 639-3 code or
/// [`UNKNOWN_LANGUAGE`].
pub fn detect_language(text: &str) -> String {
    if text.trim().is_empty() {
        return UNKNOWN_LANGUAGE.to_string();
    }

    match whatlang::detect(text) {
        Some(info) if info.is_reliable() => info.lang().code().to_string(),
        Some(info) => {
            trace!(
                "Low-confidence detection ({:?}, {:.2}), reporting unknown",
                info.lang(),
                info.confidence()
            );
            UNKNOWN_LANGUAGE.to_string()
        }
        None => UNKNOWN_LANGUAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_unknown() {
        assert_eq!(detect_language(""), UNKNOWN_LANGUAGE);
        assert_eq!(detect_language("   \t "), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_english_text() {
        let text = "The quick brown fox jumps over the lazy dog while the \
                    children watch from the garden and laugh together about \
                    the silly animals running through the tall green grass.";
        assert_eq!(detect_language(text), "eng");
    }

    #[test]
    fn test_gibberish_does_not_panic() {
        // Whatever the detector decides, the call must return a value.
        let out = detect_language("zzzz qqqq 1234 !!");
        assert!(!out.is_empty());
    }
}
