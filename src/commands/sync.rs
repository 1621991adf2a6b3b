//! Sync command: one-way bulk propagation from the store to the search index

use super::push_error_sample;
use crate::error::{Error, Result};
use crate::index::{IndexedDocument, SearchIndex};
use crate::store::AnnotationStore;
use serde::Serialize;
use tracing::{error, info, warn};

/// Statistics from a sync run
#[derive(Debug, Default, Serialize)]
pub struct SyncStats {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub error_sample: Vec<String>,
}

/// Stream all stored documents into the search index in fixed-size batches.
///
/// An empty store is a no-op success. An unreachable index before work
/// begins is fatal. Index-side batch rejections are counted and the loop
/// continues; a transport failure aborts the run.
pub async fn cmd_sync(
    store: &AnnotationStore,
    index: &SearchIndex,
    batch_size: i64,
) -> Result<SyncStats> {
    let total = store.count().await? as u64;
    let mut stats = SyncStats {
        total,
        ..Default::default()
    };

    if total == 0 {
        info!("No documents to sync; store is empty");
        return Ok(stats);
    }

    index.ping().await?;
    index.ensure_index().await?;

    info!("Syncing {} documents to the search index", total);

    let mut after_id = 0i64;
    loop {
        let batch = store.fetch_batch(after_id, batch_size).await?;
        let Some(last) = batch.last() else {
            break;
        };
        after_id = last.id;

        let docs: Vec<(String, IndexedDocument)> = batch
            .iter()
            .map(|doc| {
                (
                    IndexedDocument::index_id(doc),
                    IndexedDocument::project(doc, index.provenance()),
                )
            })
            .collect();

        match index.bulk_index(&docs).await {
            Ok(outcome) => {
                stats.succeeded += outcome.succeeded;
                stats.failed += outcome.failed;
                for cause in outcome.error_sample {
                    push_error_sample(&mut stats.error_sample, cause);
                }
            }
            Err(Error::Index(msg)) => {
                // The index rejected this batch; remaining batches may
                // still succeed.
                warn!("Batch of {} rejected: {}", docs.len(), msg);
                stats.failed += docs.len() as u64;
                push_error_sample(&mut stats.error_sample, msg);
            }
            Err(e) => {
                error!(
                    "Bulk transport failure after {} succeeded, {} failed: {}",
                    stats.succeeded, stats.failed, e
                );
                return Err(e);
            }
        }
    }

    info!(
        "Sync finished — total={} succeeded={} failed={}",
        stats.total, stats.succeeded, stats.failed
    );
    Ok(stats)
}

pub fn print_sync_stats(stats: &SyncStats) {
    println!("\n✓ Index sync complete");
    println!("  Documents in store: {}", stats.total);
    println!("  Indexed: {}", stats.succeeded);
    println!("  Failed: {}", stats.failed);
    for cause in &stats.error_sample {
        println!("  Sample error: {}", cause);
    }
}
