//! Analyze command: stateless single-text annotation
//!
//! This is the library surface consumed by an HTTP wrapper: it always
//! returns best-effort fields and never fails because of text content.

use crate::normalize::normalize;
use crate::record::Annotation;
use crate::sentiment::{SentimentLabel, SentimentScorer, SentimentScores, TokenWeight};
use serde::Serialize;

/// Single-text annotation response
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedText {
    /// The input text, echoed unmodified
    pub texte: String,
    pub language: String,
    pub sentiment: SentimentLabel,
    pub sentiment_scores: SentimentScores,
    pub sentiment_tokens: Vec<TokenWeight>,
}

/// Annotate one text, bypassing storage.
pub fn cmd_analyze(scorer: &SentimentScorer, text: &str) -> AnalyzedText {
    let canonical = normalize(Some(text));
    let annotation = Annotation::compute(scorer, &canonical);

    AnalyzedText {
        texte: text.to_string(),
        language: annotation.language,
        sentiment: annotation.sentiment,
        sentiment_scores: annotation.sentiment_scores,
        sentiment_tokens: annotation.sentiment_tokens,
    }
}

pub fn print_analysis(analysis: &AnalyzedText) {
    println!("Text: {}", analysis.texte);
    println!("Language: {}", analysis.language);
    println!(
        "Sentiment: {} (compound {:.4})",
        analysis.sentiment, analysis.sentiment_scores.compound
    );
    for token in &analysis.sentiment_tokens {
        println!("  {:>8.2}  {}", token.value, token.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::Lexicon;

    fn scorer() -> SentimentScorer {
        SentimentScorer::new(Lexicon::from_pairs([("good", 1.9), ("bad", -2.5)]))
    }

    #[test]
    fn test_analyze_echoes_input_and_normalizes_for_scoring() {
        let out = cmd_analyze(&scorer(), "good stuff at http://spam.example");
        // The echoed text keeps the URL; the scoring does not see it.
        assert_eq!(out.texte, "good stuff at http://spam.example");
        assert_eq!(out.sentiment, SentimentLabel::Positive);
        assert_eq!(out.sentiment_tokens.len(), 1);
        assert_eq!(out.sentiment_tokens[0].token, "good");
    }

    #[test]
    fn test_analyze_never_fails_on_blank_text() {
        let out = cmd_analyze(&scorer(), "   ");
        assert_eq!(out.language, "unknown");
        assert_eq!(out.sentiment, SentimentLabel::Neutral);
        assert_eq!(out.sentiment_scores.neu, 1.0);
        assert!(out.sentiment_tokens.is_empty());
    }
}
