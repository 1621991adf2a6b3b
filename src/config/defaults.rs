//! Default values for configuration

/// Default search index URL for local development
pub fn default_index_url() -> String {
    "http://127.0.0.1:9200".to_string()
}

/// Default search index name
pub fn default_index_name() -> String {
    "harassment_posts".to_string()
}

/// Default provenance tag recorded on every indexed document
pub fn default_provenance_tag() -> String {
    "dataset_kaggle".to_string()
}

/// Default connect/request timeout for the search index, in seconds
pub fn default_index_timeout_secs() -> u64 {
    8
}

/// Default identity key column
pub fn default_identity_key() -> super::IdentityKey {
    super::IdentityKey::Texte
}

/// Default cursor batch size for store scans and bulk indexing
pub fn default_batch_size() -> i64 {
    500
}

/// Default: annotate CSV rows before upserting them
pub fn default_annotate_before_upsert() -> bool {
    true
}
