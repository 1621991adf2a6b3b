//! lexitag — lexicon-based text annotation pipeline
//!
//! Annotates short text posts with language and sentiment labels and keeps
//! two downstream stores consistent with the source dataset: a primary
//! SQLite document store and a secondary search index. The pipeline is
//! batch-oriented and idempotent end to end, so any run can be safely
//! repeated after interruption.

pub mod commands;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod index;
pub mod lang;
pub mod normalize;
pub mod record;
pub mod sentiment;
pub mod store;
