//! Custom error types for lexitag

use thiserror::Error;

/// Main error type for lexitag operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Search index error: {0}")]
    Index(String),

    #[error("Search index unreachable at {0}")]
    IndexUnreachable(String),

    #[error("Lexicon unavailable: {0}")]
    Lexicon(String),

    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for lexitag
pub type Result<T> = std::result::Result<T, Error>;
