//! Text normalization
//!
//! Produces the canonical form of raw post text. The canonical text is the
//! input to dedup keying, language detection, and sentiment scoring, so
//! normalization must be a pure, idempotent function of the raw text.

use regex::Regex;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z][a-z0-9+.-]*://\S+|\bwww\.\S+").expect("valid URL regex")
});

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email regex"));

static CTRL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t]+").expect("valid control-char regex"));

static MULTI_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid whitespace regex"));

/// Normalize raw text into its canonical form.
///
/// Applied in fixed order: missing/blank input becomes the empty string,
/// URL-like and email-like substrings become a single space, CR/LF/TAB runs
/// collapse to one space, remaining whitespace runs collapse to one space,
/// and the result is trimmed. Never fails.
pub fn normalize(raw: Option<&str>) -> String {
    let Some(s) = raw else {
        return String::new();
    };
    if s.trim().is_empty() {
        return String::new();
    }

    let s = URL_RE.replace_all(s, " ");
    let s = EMAIL_RE.replace_all(&s, " ");
    let s = CTRL_RE.replace_all(&s, " ");
    let s = MULTI_SPACE_RE.replace_all(&s, " ");
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_blank_input() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
        assert_eq!(normalize(Some("   \t\n ")), "");
    }

    #[test]
    fn test_strips_urls_and_emails() {
        let out = normalize(Some("see http://x.co and a@b.com now"));
        assert_eq!(out, "see and now");
        assert!(!out.contains("http://x.co"));
        assert!(!out.contains("a@b.com"));
    }

    #[test]
    fn test_strips_www_and_schemes() {
        assert_eq!(normalize(Some("go to www.example.org please")), "go to please");
        assert_eq!(normalize(Some("link ftp://files.example.org/x end")), "link end");
    }

    #[test]
    fn test_collapses_control_and_whitespace_runs() {
        assert_eq!(normalize(Some("a\r\n\tb   c")), "a b c");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "see http://x.co and a@b.com now",
            "  padded\t\ttext\n",
            "plain words",
            "",
        ];
        for raw in inputs {
            let once = normalize(Some(raw));
            let twice = normalize(Some(&once));
            assert_eq!(once, twice, "normalize not idempotent for {:?}", raw);
        }
    }
}
