//! First-wins deduplication over record sequences
//!
//! Collapses records sharing a canonical text to one survivor, preserving
//! first-seen order. The store-side counterpart (removing pre-existing
//! duplicate rows before the uniqueness constraint is established) lives on
//! [`crate::store::AnnotationStore::ensure_unique_key`].

use crate::record::Record;
use std::collections::HashSet;

/// Drop later records whose canonical text was already seen.
///
/// First occurrence wins; duplicates are silently discarded, never errored.
pub fn dedupe_records(records: Vec<Record>) -> Vec<Record> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.texte.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, texte: &str) -> Record {
        Record {
            id_post: Some(id),
            texte: texte.to_string(),
            category: "Unknown".to_string(),
            label: "Unknown".to_string(),
        }
    }

    #[test]
    fn test_first_wins_order_preserved() {
        let records = vec![
            record(1, "alpha"),
            record(2, "beta"),
            record(3, "alpha"),
            record(4, "gamma"),
            record(5, "beta"),
        ];

        let deduped = dedupe_records(records);
        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped[0].id_post, Some(1));
        assert_eq!(deduped[1].id_post, Some(2));
        assert_eq!(deduped[2].id_post, Some(4));
    }

    #[test]
    fn test_idempotent() {
        let records = vec![record(1, "a"), record(2, "a"), record(3, "b")];
        let once = dedupe_records(records);
        let twice = dedupe_records(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe_records(Vec::new()).is_empty());
    }
}
