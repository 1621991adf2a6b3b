//! Polarity lexicon loading
//!
//! Parses VADER-format lexicon files: one entry per line, token first, then
//! the signed mean polarity, with any trailing columns ignored. Malformed
//! lines are skipped and counted, never fatal.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Static mapping from lowercase token to signed polarity value
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<String, f64>,
}

impl Lexicon {
    /// Load a lexicon from a file.
    ///
    /// A missing or unreadable file is a named fatal error, raised when the
    /// caller actually needs the lexicon rather than at program start.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Lexicon(format!("{}: {}", path.display(), e)))?;
        let lexicon = Self::parse(&content);
        if lexicon.is_empty() {
            return Err(Error::Lexicon(format!(
                "{}: no usable entries",
                path.display()
            )));
        }
        debug!("Loaded {} lexicon entries from {:?}", lexicon.len(), path);
        Ok(lexicon)
    }

    /// Parse lexicon content, skipping malformed lines.
    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();
        let mut skipped = 0usize;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(token), Some(raw_value)) = (fields.next(), fields.next()) else {
                skipped += 1;
                continue;
            };
            match raw_value.parse::<f64>() {
                Ok(value) if value.is_finite() => {
                    entries.insert(token.to_lowercase(), value);
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!("Skipped {} malformed lexicon lines", skipped);
        }

        Self { entries }
    }

    /// Build a lexicon from explicit pairs (used in tests and fixtures)
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(token, value)| (token.into().to_lowercase(), value))
            .collect();
        Self { entries }
    }

    /// Look up the polarity of a cleaned, lowercased token
    pub fn get(&self, token: &str) -> Option<f64> {
        self.entries.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
