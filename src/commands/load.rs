//! Load command: cleaned CSV rows into the annotation store

use super::push_error_sample;
use crate::dedupe::dedupe_records;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::store::AnnotationStore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Statistics from a load run
#[derive(Debug, Default, Serialize)]
pub struct LoadStats {
    pub rows_read: u64,
    pub duplicates_dropped: u64,
    pub upserted: u64,
    pub failed: u64,
    /// Bounded sample of failure causes
    pub error_sample: Vec<String>,
}

/// Row shape of the cleaned dataset CSV. Header aliases cover the raw
/// dataset export before column renaming.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id_post: Option<i64>,
    #[serde(alias = "text", default)]
    texte: Option<String>,
    #[serde(rename = "Type", alias = "type", alias = "types", default)]
    category: Option<String>,
    #[serde(rename = "Label", alias = "label", default)]
    label: Option<String>,
}

/// Read records from a CSV file, normalizing text and defaulting labels.
///
/// A missing file is a fatal precondition failure; a malformed row is
/// skipped with a warning. Rows without an id get a sequential one.
pub fn read_csv_records(path: &Path) -> Result<Vec<Record>> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();

    for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
        match row {
            Ok(row) => {
                let id_post = row.id_post.or(Some(i as i64 + 1));
                records.push(Record::from_raw(
                    id_post,
                    row.texte.as_deref(),
                    row.category,
                    row.label,
                ));
            }
            Err(e) => {
                warn!("Skipping malformed CSV row {}: {}", i + 1, e);
            }
        }
    }

    Ok(records)
}

/// Load the cleaned CSV into the store: normalize, dedupe first-wins, then
/// upsert each survivor by the configured identity key.
pub async fn cmd_load(store: &AnnotationStore, csv_path: &Path) -> Result<LoadStats> {
    info!("Loading records from {:?}", csv_path);

    let records = read_csv_records(csv_path)?;
    let mut stats = LoadStats {
        rows_read: records.len() as u64,
        ..Default::default()
    };

    let deduped = dedupe_records(records);
    stats.duplicates_dropped = stats.rows_read - deduped.len() as u64;

    for record in &deduped {
        match store.upsert(record, None).await {
            Ok(_) => stats.upserted += 1,
            Err(e) => {
                let msg = format!("upsert failed for id_post={:?}: {}", record.id_post, e);
                warn!("{}", msg);
                stats.failed += 1;
                push_error_sample(&mut stats.error_sample, msg);
            }
        }
    }

    info!(
        "Load complete: {} rows read, {} duplicates dropped, {} upserted, {} failed",
        stats.rows_read, stats.duplicates_dropped, stats.upserted, stats.failed
    );
    Ok(stats)
}

pub fn print_load_stats(stats: &LoadStats) {
    println!("\n✓ Load complete");
    println!("  Rows read: {}", stats.rows_read);
    println!("  Duplicates dropped: {}", stats.duplicates_dropped);
    println!("  Documents upserted: {}", stats.upserted);
    println!("  Failed: {}", stats.failed);
}
