//! Configuration management for lexitag
//!
//! Handles loading and validating configuration from TOML files.
//! Components never read environment variables themselves; the CLI constructs
//! one `Config` and passes it down.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The store column used to decide document uniqueness.
///
/// Exactly one key is active per store; switching keys drops the old
/// uniqueness constraint and establishes the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityKey {
    #[serde(rename = "id_post")]
    PostId,
    #[serde(rename = "texte")]
    Texte,
}

impl IdentityKey {
    /// Column name in the posts table
    pub fn column(&self) -> &'static str {
        match self {
            IdentityKey::PostId => "id_post",
            IdentityKey::Texte => "texte",
        }
    }

    /// The column of the other, inactive key
    pub fn other_column(&self) -> &'static str {
        match self {
            IdentityKey::PostId => "texte",
            IdentityKey::Texte => "id_post",
        }
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl std::str::FromStr for IdentityKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "id_post" => Ok(IdentityKey::PostId),
            "texte" => Ok(IdentityKey::Texte),
            _ => Err(Error::Config(format!(
                "Unknown identity key: {} (expected 'id_post' or 'texte')",
                s
            ))),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Search index configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Path to the polarity lexicon file (VADER format)
    #[serde(default)]
    pub lexicon_file: Option<PathBuf>,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Search index configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Index base URL
    #[serde(default = "default_index_url")]
    pub url: String,

    /// Target index name
    #[serde(default = "default_index_name")]
    pub name: String,

    /// Provenance tag stamped on every indexed document
    #[serde(default = "default_provenance_tag")]
    pub provenance_tag: String,

    /// Request timeout in seconds (connection attempts fail fast)
    #[serde(default = "default_index_timeout_secs")]
    pub timeout_secs: u64,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Identity key for store uniqueness: "id_post" or "texte"
    #[serde(default = "default_identity_key")]
    pub identity_key: IdentityKey,

    /// Cursor batch size for scans and bulk indexing
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,

    /// Whether the CSV path annotates rows before upserting them.
    /// When false, bare records are stored first and annotation is applied
    /// as a second step.
    #[serde(default = "default_annotate_before_upsert")]
    pub annotate_before_upsert: bool,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for lexitag data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to SQLite database
    pub db_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            pipeline: PipelineConfig::default(),
            lexicon_file: None,
            paths: PathsConfig::default(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: default_index_url(),
            name: default_index_name(),
            provenance_tag: default_provenance_tag(),
            timeout_secs: default_index_timeout_secs(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            identity_key: default_identity_key(),
            batch_size: default_batch_size(),
            annotate_before_upsert: default_annotate_before_upsert(),
        }
    }
}

impl Config {
    /// Get the default base directory for lexitag (~/.lexitag)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lexitag")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            db_file: base.join("posts.db"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            db_file: base.join("posts.db"),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a base directory, falling back to documented
    /// defaults when no config file exists there.
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Resolved lexicon file path (configured path or base_dir default)
    pub fn lexicon_path(&self) -> PathBuf {
        self.lexicon_file
            .clone()
            .unwrap_or_else(|| self.paths.base_dir.join("vader_lexicon.txt"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.batch_size < 1 {
            return Err(Error::Config(
                "pipeline.batch_size must be at least 1".to_string(),
            ));
        }

        if self.index.timeout_secs == 0 {
            return Err(Error::Config(
                "index.timeout_secs must be at least 1".to_string(),
            ));
        }

        if self.index.name.trim().is_empty() {
            return Err(Error::Config("index.name must not be empty".to_string()));
        }

        Ok(())
    }
}
