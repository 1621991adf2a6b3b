//! Search index integration
//!
//! This module wraps an Elasticsearch-compatible REST API and provides:
//! - Reachability checks and index creation
//! - Bulk NDJSON document submission with per-item error accounting
//!
//! The index is a derived, rebuildable view: it owns no data that cannot be
//! reconstructed from the annotation store.

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::store::StoredDocument;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Bounded number of failure causes retained per sync run
pub const MAX_ERROR_SAMPLE: usize = 3;

/// Projection of a stored document into the search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id_post: Option<i64>,
    pub titre: String,
    pub texte: String,
    pub language: String,
    #[serde(rename = "type")]
    pub category: String,
    pub sentiment: String,
    /// Compound sentiment score only
    pub score: f64,
    /// ISO-8601 timestamp; falls back to now when the source has none
    pub date: String,
    /// Fixed provenance tag for the origin dataset
    pub source: String,
}

impl IndexedDocument {
    /// Project a stored document, renaming fields and stamping provenance
    pub fn project(doc: &StoredDocument, provenance: &str) -> Self {
        Self {
            id_post: doc.id_post,
            titre: String::new(),
            texte: doc.texte.clone(),
            language: doc.language.clone().unwrap_or_default(),
            category: doc.category.clone(),
            sentiment: doc.sentiment.clone().unwrap_or_default(),
            score: doc.scores().map(|s| s.compound).unwrap_or(0.0),
            date: if doc.updated_at.trim().is_empty() {
                Utc::now().to_rfc3339()
            } else {
                doc.updated_at.clone()
            },
            source: provenance.to_string(),
        }
    }

    /// Index document id: the post id, or the internal row id when absent
    pub fn index_id(doc: &StoredDocument) -> String {
        match doc.id_post {
            Some(id_post) => id_post.to_string(),
            None => format!("row-{}", doc.id),
        }
    }
}

/// Outcome of one bulk submission
#[derive(Debug, Default, Clone, Serialize)]
pub struct BulkOutcome {
    pub succeeded: u64,
    pub failed: u64,
    pub error_sample: Vec<String>,
}

/// Search index handle
pub struct SearchIndex {
    client: Client,
    base_url: String,
    index: String,
    provenance: String,
}

impl SearchIndex {
    /// Build a client from config. Requests time out fast rather than
    /// hanging indefinitely.
    pub fn connect(config: &IndexConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            index: config.name.clone(),
            provenance: config.provenance_tag.clone(),
        })
    }

    pub fn provenance(&self) -> &str {
        &self.provenance
    }

    /// Check that the index endpoint is reachable. Called before any sync
    /// work begins; failure here is fatal for the run.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|_| Error::IndexUnreachable(self.base_url.clone()))?;

        if !response.status().is_success() {
            return Err(Error::IndexUnreachable(format!(
                "{} (HTTP {})",
                self.base_url,
                response.status()
            )));
        }
        Ok(())
    }

    /// Create the target index if absent. A pre-existing index is not an
    /// error.
    pub async fn ensure_index(&self) -> Result<()> {
        let url = format!("{}/{}", self.base_url, self.index);

        let head = self.client.head(&url).send().await?;
        if head.status().is_success() {
            debug!("Index {} already exists", self.index);
            return Ok(());
        }

        let response = self.client.put(&url).send().await?;
        // 400 means a concurrent creator won the race.
        if response.status().is_success() || response.status() == StatusCode::BAD_REQUEST {
            info!("Index {} ready", self.index);
            Ok(())
        } else {
            Err(Error::Index(format!(
                "could not create index {}: HTTP {}",
                self.index,
                response.status()
            )))
        }
    }

    /// Submit one batch of documents via the bulk NDJSON endpoint.
    ///
    /// Transport failures surface as [`Error::Http`]; an index-side rejection
    /// of the whole request surfaces as [`Error::Index`]; item-level errors
    /// are counted in the returned outcome with a bounded cause sample.
    pub async fn bulk_index(&self, docs: &[(String, IndexedDocument)]) -> Result<BulkOutcome> {
        if docs.is_empty() {
            return Ok(BulkOutcome::default());
        }

        let mut body = String::new();
        for (id, doc) in docs {
            body.push_str(&serde_json::to_string(
                &json!({"index": {"_index": self.index, "_id": id}}),
            )?);
            body.push('\n');
            body.push_str(&serde_json::to_string(doc)?);
            body.push('\n');
        }

        debug!("Submitting {} documents to {}", docs.len(), self.index);

        let response = self
            .client
            .post(format!("{}/_bulk", self.base_url))
            .header("content-type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Index(format!(
                "bulk request rejected: HTTP {}",
                response.status()
            )));
        }

        let parsed: BulkResponse = response.json().await?;
        let mut outcome = BulkOutcome::default();
        for item in &parsed.items {
            if (200..300).contains(&item.status()) {
                outcome.succeeded += 1;
            } else {
                outcome.failed += 1;
                if outcome.error_sample.len() < MAX_ERROR_SAMPLE {
                    outcome.error_sample.push(item.error_reason());
                }
            }
        }
        Ok(outcome)
    }
}

/// Bulk API response shape
#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    items: Vec<BulkItem>,
}

/// One item result; the action key varies ("index", "create", ...)
#[derive(Debug, Deserialize)]
struct BulkItem {
    #[serde(default)]
    index: Option<BulkItemStatus>,
    #[serde(default)]
    create: Option<BulkItemStatus>,
}

#[derive(Debug, Deserialize)]
struct BulkItemStatus {
    #[serde(default = "server_error_status")]
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

fn server_error_status() -> u16 {
    500
}

impl BulkItem {
    fn detail(&self) -> Option<&BulkItemStatus> {
        self.index.as_ref().or(self.create.as_ref())
    }

    fn status(&self) -> u16 {
        self.detail().map(|d| d.status).unwrap_or(500)
    }

    fn error_reason(&self) -> String {
        self.detail()
            .and_then(|d| d.error.as_ref())
            .map(|e| {
                e.get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            })
            .unwrap_or_else(|| "unknown error".to_string())
    }
}
