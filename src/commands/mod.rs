//! Command implementations
//!
//! Each batch command constructs its collaborators up front (fatal
//! preconditions fail before any work), recovers per-record failures, and
//! returns an explicit stats struct.

mod analyze;
mod annotate;
mod load;
mod sync;

pub use analyze::{cmd_analyze, print_analysis, AnalyzedText};
pub use annotate::{
    cmd_annotate_csv, cmd_annotate_store, print_annotate_stats, print_csv_annotate_stats,
    AnnotateOptions, AnnotateStats, CsvAnnotateOptions, CsvAnnotateStats,
};
pub use load::{cmd_load, print_load_stats, read_csv_records, LoadStats};
pub use sync::{cmd_sync, print_sync_stats, SyncStats};

use crate::index::MAX_ERROR_SAMPLE;

/// Keep at most a bounded sample of failure causes. Failure counters stay
/// exact; only the retained causes are capped, so a systemic failure cannot
/// grow stats with the store.
pub(crate) fn push_error_sample(sample: &mut Vec<String>, cause: String) {
    if sample.len() < MAX_ERROR_SAMPLE {
        sample.push(cause);
    }
}
