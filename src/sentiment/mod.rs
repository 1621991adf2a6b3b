//! Lexicon-based sentiment scoring with token attribution
//!
//! Produces four scores (neg, neu, pos, compound), a three-way label, and a
//! ranked explanation of the lexicon tokens that contributed. The scores are
//! wholly derived from the canonical text; the token explanation is purely
//! explanatory and never feeds back into the label.

mod lexicon;

pub use lexicon::Lexicon;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Compound score at or above this is labeled positive
pub const POSITIVE_THRESHOLD: f64 = 0.05;

/// Compound score at or below this is labeled negative
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Maximum number of explanatory tokens retained
pub const MAX_TOP_TOKENS: usize = 8;

// Normalization constant of the compound score, s / sqrt(s^2 + alpha).
const NORMALIZATION_ALPHA: f64 = 15.0;

// Punctuation stripped from the edges of each token before lexicon lookup.
const EDGE_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '\'', '"', '(', ')', '[', ']', '{', '}',
];

/// Three-way sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

/// The four aggregate scores; neg + neu + pos ≈ 1.0, compound ∈ [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

impl SentimentScores {
    /// Fixed result for empty or whitespace-only text
    pub fn neutral() -> Self {
        Self {
            neg: 0.0,
            neu: 1.0,
            pos: 0.0,
            compound: 0.0,
        }
    }
}

/// One explanatory token with its lexicon polarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenWeight {
    pub token: String,
    pub value: f64,
}

/// Full scoring outcome for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub scores: SentimentScores,
    pub top_tokens: Vec<TokenWeight>,
}

impl Sentiment {
    /// Fixed neutral outcome for blank text
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            scores: SentimentScores::neutral(),
            top_tokens: Vec::new(),
        }
    }
}

/// Lexicon-backed scorer
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    lexicon: Lexicon,
}

impl SentimentScorer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Map a compound score to its label. Thresholds are fixed constants of
    /// the design, not configurable per call.
    pub fn label_for(compound: f64) -> SentimentLabel {
        if compound >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    /// Score canonical text. Total: blank input yields the fixed neutral
    /// outcome instead of an error.
    pub fn score(&self, text: &str) -> Sentiment {
        if text.trim().is_empty() {
            return Sentiment::neutral();
        }

        let mut valence_sum = 0.0f64;
        let mut pos_sum = 0.0f64;
        let mut neg_sum = 0.0f64;
        let mut neutral_count = 0usize;
        let mut hits: Vec<TokenWeight> = Vec::new();

        for raw_token in text.split_whitespace() {
            let cleaned = raw_token
                .to_lowercase()
                .trim_matches(|c| EDGE_PUNCTUATION.contains(&c))
                .to_string();

            match self.lexicon.get(&cleaned) {
                Some(value) if value > 0.0 => {
                    valence_sum += value;
                    pos_sum += value + 1.0;
                    hits.push(TokenWeight {
                        token: cleaned,
                        value,
                    });
                }
                Some(value) if value < 0.0 => {
                    valence_sum += value;
                    neg_sum += value - 1.0;
                    hits.push(TokenWeight {
                        token: cleaned,
                        value,
                    });
                }
                Some(value) => {
                    // zero-valued lexicon entry
                    neutral_count += 1;
                    hits.push(TokenWeight {
                        token: cleaned,
                        value,
                    });
                }
                None => neutral_count += 1,
            }
        }

        let compound = normalize_valence(valence_sum);
        let total = pos_sum + neg_sum.abs() + neutral_count as f64;
        let scores = if total > 0.0 {
            SentimentScores {
                neg: round3(neg_sum.abs() / total),
                neu: round3(neutral_count as f64 / total),
                pos: round3(pos_sum / total),
                compound: round4(compound),
            }
        } else {
            SentimentScores::neutral()
        };

        // Stable sort: equal magnitudes keep original token order.
        hits.sort_by(|a, b| {
            b.value
                .abs()
                .partial_cmp(&a.value.abs())
                .unwrap_or(Ordering::Equal)
        });
        hits.truncate(MAX_TOP_TOKENS);

        Sentiment {
            label: Self::label_for(scores.compound),
            scores,
            top_tokens: hits,
        }
    }
}

/// Squash an unbounded valence sum into [-1, 1]
fn normalize_valence(sum: f64) -> f64 {
    let normalized = sum / (sum * sum + NORMALIZATION_ALPHA).sqrt();
    normalized.clamp(-1.0, 1.0)
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn round4(v: f64) -> f64 {
    (v * 10000.0).round() / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> SentimentScorer {
        SentimentScorer::new(Lexicon::from_pairs([
            ("great", 3.0),
            ("good", 1.9),
            ("bad", -2.5),
            ("awful", -3.0),
            ("meh", 0.0),
        ]))
    }

    #[test]
    fn test_blank_text_fixed_neutral() {
        let s = scorer();
        for text in ["", "   ", "\t\n"] {
            let out = s.score(text);
            assert_eq!(out.label, SentimentLabel::Neutral);
            assert_eq!(out.scores.neg, 0.0);
            assert_eq!(out.scores.neu, 1.0);
            assert_eq!(out.scores.pos, 0.0);
            assert_eq!(out.scores.compound, 0.0);
            assert!(out.top_tokens.is_empty());
        }
    }

    #[test]
    fn test_label_threshold_boundaries() {
        assert_eq!(SentimentScorer::label_for(0.05), SentimentLabel::Positive);
        assert_eq!(SentimentScorer::label_for(-0.05), SentimentLabel::Negative);
        assert_eq!(SentimentScorer::label_for(0.049), SentimentLabel::Neutral);
        assert_eq!(SentimentScorer::label_for(-0.049), SentimentLabel::Neutral);
        assert_eq!(SentimentScorer::label_for(0.9), SentimentLabel::Positive);
        assert_eq!(SentimentScorer::label_for(-0.9), SentimentLabel::Negative);
    }

    #[test]
    fn test_threshold_boundaries_reachable_through_scoring() {
        // 0.194 / sqrt(0.194² + 15) = 0.050028, which round4 lands exactly
        // on the positive threshold; 0.19 rounds to 0.049 and stays neutral.
        let s = SentimentScorer::new(Lexicon::from_pairs([
            ("edge", 0.194),
            ("gloom", -0.194),
            ("mild", 0.19),
        ]));

        let out = s.score("edge");
        assert_eq!(out.scores.compound, 0.05);
        assert_eq!(out.label, SentimentLabel::Positive);

        let out = s.score("gloom");
        assert_eq!(out.scores.compound, -0.05);
        assert_eq!(out.label, SentimentLabel::Negative);

        let out = s.score("mild");
        assert_eq!(out.scores.compound, 0.049);
        assert_eq!(out.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_positive_and_negative_texts() {
        let s = scorer();

        let out = s.score("what a great good day");
        assert_eq!(out.label, SentimentLabel::Positive);
        assert!(out.scores.compound > 0.5);
        assert!(out.scores.pos > out.scores.neg);

        let out = s.score("an awful bad experience");
        assert_eq!(out.label, SentimentLabel::Negative);
        assert!(out.scores.compound < -0.5);
        assert!(out.scores.neg > out.scores.pos);
    }

    #[test]
    fn test_scores_sum_to_one() {
        let s = scorer();
        let out = s.score("a good day with one bad moment and plenty of plain words");
        let sum = out.scores.neg + out.scores.neu + out.scores.pos;
        assert!((sum - 1.0).abs() < 0.01, "neg+neu+pos = {}", sum);
    }

    #[test]
    fn test_token_attribution_order_and_cap() {
        let s = scorer();

        let out = s.score("good bad awful great meh");
        let tokens: Vec<&str> = out.top_tokens.iter().map(|t| t.token.as_str()).collect();
        // Sorted by descending |value|; "meh" (0.0) ranks last.
        assert_eq!(tokens, vec!["awful", "great", "bad", "good", "meh"]);

        let many = "good bad good bad good bad good bad good bad";
        let out = s.score(many);
        assert_eq!(out.top_tokens.len(), MAX_TOP_TOKENS);
    }

    #[test]
    fn test_tie_break_keeps_original_order() {
        let s = SentimentScorer::new(Lexicon::from_pairs([("up", 2.0), ("down", -2.0)]));
        let out = s.score("down up down up");
        let tokens: Vec<&str> = out.top_tokens.iter().map(|t| t.token.as_str()).collect();
        assert_eq!(tokens, vec!["down", "up", "down", "up"]);
    }

    #[test]
    fn test_punctuation_stripped_before_lookup() {
        let s = scorer();
        let out = s.score("(Good!) \"bad\"... {meh}?");
        let tokens: Vec<&str> = out.top_tokens.iter().map(|t| t.token.as_str()).collect();
        assert_eq!(tokens, vec!["bad", "good", "meh"]);
    }

    #[test]
    fn test_explanation_does_not_change_label() {
        // A text with >8 lexicon hits truncates the explanation but keeps
        // the same scores as the untruncated aggregation would give.
        let s = scorer();
        let out = s.score("good good good good good good good good good bad");
        assert_eq!(out.top_tokens.len(), MAX_TOP_TOKENS);
        assert_eq!(out.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_unknown_words_only_is_neutral() {
        let s = scorer();
        let out = s.score("completely ordinary sentence here");
        assert_eq!(out.label, SentimentLabel::Neutral);
        assert_eq!(out.scores.compound, 0.0);
        assert_eq!(out.scores.neu, 1.0);
        assert!(out.top_tokens.is_empty());
    }
}
