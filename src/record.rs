//! Core pipeline records
//!
//! A [`Record`] is the unit of work flowing through the pipeline; an
//! [`Annotation`] is the language/sentiment result derived entirely from its
//! canonical text.

use crate::normalize::normalize;
use crate::sentiment::{SentimentLabel, SentimentScorer, SentimentScores, TokenWeight};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Sentinel used for missing category/label values
pub const UNKNOWN_SENTINEL: &str = "Unknown";

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static MULTI_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("valid dash regex"));

/// One post record with canonical text and source-dataset labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id_post: Option<i64>,
    /// Canonical text, never null; empty string when the raw text was blank
    pub texte: String,
    #[serde(rename = "Type")]
    pub category: String,
    #[serde(rename = "Label")]
    pub label: String,
}

impl Record {
    /// Build a record from raw dataset fields, normalizing the text and
    /// defaulting missing labels to the `"Unknown"` sentinel.
    pub fn from_raw(
        id_post: Option<i64>,
        raw_text: Option<&str>,
        category: Option<String>,
        label: Option<String>,
    ) -> Self {
        Self {
            id_post,
            texte: normalize(raw_text),
            category: sentinel_or(category),
            label: hyphenate_label(label),
        }
    }
}

/// Replace missing or NaN-like values with the sentinel
fn sentinel_or(value: Option<String>) -> String {
    match value {
        Some(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
                UNKNOWN_SENTINEL.to_string()
            } else {
                trimmed.to_string()
            }
        }
        None => UNKNOWN_SENTINEL.to_string(),
    }
}

/// Label cleanup from the source dataset: internal whitespace becomes a
/// single hyphen.
fn hyphenate_label(value: Option<String>) -> String {
    let s = sentinel_or(value);
    let s = WHITESPACE_RE.replace_all(&s, "-");
    MULTI_DASH_RE.replace_all(&s, "-").into_owned()
}

/// Language and sentiment annotation, wholly derived from canonical text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub language: String,
    pub sentiment: SentimentLabel,
    pub sentiment_scores: SentimentScores,
    pub sentiment_tokens: Vec<TokenWeight>,
}

impl Annotation {
    /// Annotate canonical text. Never fails: unanalyzable text degrades to
    /// the unknown-language, neutral-sentiment defaults.
    pub fn compute(scorer: &SentimentScorer, texte: &str) -> Self {
        let language = crate::lang::detect_language(texte);
        let sentiment = scorer.score(texte);
        Self {
            language,
            sentiment: sentiment.label,
            sentiment_scores: sentiment.scores,
            sentiment_tokens: sentiment.top_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::Lexicon;

    #[test]
    fn test_from_raw_normalizes_and_defaults() {
        let r = Record::from_raw(Some(7), Some("see http://x.co  now"), None, None);
        assert_eq!(r.id_post, Some(7));
        assert_eq!(r.texte, "see now");
        assert_eq!(r.category, UNKNOWN_SENTINEL);
        assert_eq!(r.label, UNKNOWN_SENTINEL);
    }

    #[test]
    fn test_nan_like_labels_become_unknown() {
        let r = Record::from_raw(None, None, Some("nan".into()), Some("  ".into()));
        assert_eq!(r.texte, "");
        assert_eq!(r.category, UNKNOWN_SENTINEL);
        assert_eq!(r.label, UNKNOWN_SENTINEL);
    }

    #[test]
    fn test_label_hyphenation() {
        let r = Record::from_raw(None, Some("x"), None, Some("hate  speech  online".into()));
        assert_eq!(r.label, "hate-speech-online");
    }

    #[test]
    fn test_blank_text_annotation_is_neutral_unknown() {
        let scorer = SentimentScorer::new(Lexicon::from_pairs([("good", 1.9)]));
        let a = Annotation::compute(&scorer, "");
        assert_eq!(a.language, "unknown");
        assert_eq!(a.sentiment, SentimentLabel::Neutral);
        assert_eq!(a.sentiment_scores.neu, 1.0);
        assert!(a.sentiment_tokens.is_empty());
    }

    #[test]
    fn test_record_serializes_with_dataset_field_names() {
        let r = Record::from_raw(Some(1), Some("hello"), Some("insult".into()), None);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["Type"], "insult");
        assert_eq!(json["Label"], "Unknown");
        assert_eq!(json["id_post"], 1);
    }
}
