//! Annotate command: language detection + sentiment for stored or CSV records

use super::{push_error_sample, read_csv_records};
use crate::error::Result;
use crate::record::{Annotation, Record};
use crate::sentiment::SentimentScorer;
use crate::store::AnnotationStore;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Options for a store annotation scan
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    /// Recompute annotations even when fields are already present
    pub force: bool,
    /// Cap on documents visited (not on documents updated)
    pub sample: Option<u64>,
    /// Cursor batch size
    pub batch_size: i64,
}

/// Statistics from a store annotation scan
#[derive(Debug, Default, Serialize)]
pub struct AnnotateStats {
    pub scanned: u64,
    pub updated: u64,
    pub failed: u64,
    /// Bounded sample of failure causes
    pub error_sample: Vec<String>,
}

/// Scan the store in cursor batches and annotate documents lacking
/// language/sentiment fields (all documents when forced).
///
/// Per-document persistence failures are counted and logged with the
/// offending row, never fatal to the scan.
pub async fn cmd_annotate_store(
    store: &AnnotationStore,
    scorer: &SentimentScorer,
    options: &AnnotateOptions,
) -> Result<AnnotateStats> {
    let mut stats = AnnotateStats::default();
    let mut after_id = 0i64;

    'scan: loop {
        let batch = store.fetch_batch(after_id, options.batch_size).await?;
        if batch.is_empty() {
            break;
        }

        for doc in batch {
            after_id = doc.id;

            if let Some(limit) = options.sample {
                if stats.scanned >= limit {
                    break 'scan;
                }
            }
            stats.scanned += 1;

            if !options.force && !doc.needs_annotation() {
                continue;
            }

            let annotation = Annotation::compute(scorer, &doc.texte);
            match store.apply_annotation(doc.id, &annotation).await {
                Ok(true) => stats.updated += 1,
                Ok(false) => {
                    let msg = format!("document id={} vanished during scan", doc.id);
                    warn!("{}", msg);
                    stats.failed += 1;
                    push_error_sample(&mut stats.error_sample, msg);
                }
                Err(e) => {
                    let msg = format!("error updating id={}: {}", doc.id, e);
                    warn!("{}", msg);
                    stats.failed += 1;
                    push_error_sample(&mut stats.error_sample, msg);
                }
            }
        }
    }

    info!(
        "Annotation finished — scanned={} updated={} failed={}",
        stats.scanned, stats.updated, stats.failed
    );
    Ok(stats)
}

/// Options for the CSV annotation path
#[derive(Debug, Clone)]
pub struct CsvAnnotateOptions {
    /// Cap on rows processed
    pub sample: Option<u64>,
    /// Upsert annotated records into the store after processing
    pub upsert: bool,
    /// Attach the annotation on the initial upsert; when false the bare
    /// record is stored first and annotation applied as a second step
    pub annotate_before_upsert: bool,
}

/// Statistics from a CSV annotation run
#[derive(Debug, Default, Serialize)]
pub struct CsvAnnotateStats {
    pub processed: u64,
    pub upserted: u64,
    pub failed: u64,
    /// Bounded sample of failure causes
    pub error_sample: Vec<String>,
}

/// Annotate records straight from the cleaned CSV, optionally upserting the
/// results. The store handle is only required when upserting.
pub async fn cmd_annotate_csv(
    store: Option<&AnnotationStore>,
    scorer: &SentimentScorer,
    csv_path: &Path,
    options: &CsvAnnotateOptions,
) -> Result<CsvAnnotateStats> {
    let mut records = read_csv_records(csv_path)?;
    if let Some(limit) = options.sample {
        records.truncate(limit as usize);
    }

    let mut stats = CsvAnnotateStats::default();

    for record in &records {
        stats.processed += 1;
        let annotation = Annotation::compute(scorer, &record.texte);

        if !options.upsert {
            continue;
        }
        let Some(store) = store else {
            continue;
        };

        match persist(store, record, &annotation, options.annotate_before_upsert).await {
            Ok(()) => stats.upserted += 1,
            Err(e) => {
                let msg = format!("upsert failed for id_post={:?}: {}", record.id_post, e);
                warn!("{}", msg);
                stats.failed += 1;
                push_error_sample(&mut stats.error_sample, msg);
            }
        }
    }

    info!(
        "CSV annotation finished — processed={} upserted={} failed={}",
        stats.processed, stats.upserted, stats.failed
    );
    Ok(stats)
}

async fn persist(
    store: &AnnotationStore,
    record: &Record,
    annotation: &Annotation,
    annotate_before_upsert: bool,
) -> Result<()> {
    if annotate_before_upsert {
        store.upsert(record, Some(annotation)).await?;
    } else {
        let id = store.upsert(record, None).await?;
        if !store.apply_annotation(id, annotation).await? {
            warn!("document id={} vanished before annotation", id);
        }
    }
    Ok(())
}

pub fn print_annotate_stats(stats: &AnnotateStats) {
    println!("\n✓ Annotation complete");
    println!("  Documents scanned: {}", stats.scanned);
    println!("  Documents updated: {}", stats.updated);
    println!("  Failed: {}", stats.failed);
}

pub fn print_csv_annotate_stats(stats: &CsvAnnotateStats) {
    println!("\n✓ CSV annotation complete");
    println!("  Rows processed: {}", stats.processed);
    println!("  Documents upserted: {}", stats.upserted);
    println!("  Failed: {}", stats.failed);
}
