//! YAML configuration file support for songprint.
//!
//! One file carries the settings of every stage. Every section and every
//! field is optional; missing values take the library defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "living room"
//!
//! ingest:
//!   channel_policy: "first"
//!   extensions: ["wav"]
//!
//! fingerprint:
//!   window_duration_secs: 0.5
//!   peaks_per_window: 15
//!   min_peak_distance: 200
//!   fan_out: 100
//!   min_time_delta: 2
//!   max_time_delta: 10
//!   upper_frequency_hz: 23000.0
//!   use_parallel: false
//!
//! index:
//!   use_parallel: true
//!   compression: "zstd"
//!   compression_level: 3
//!
//! matcher:
//!   max_results: 5
//!   min_score: 1
//!
//! paths:
//!   database_dir: "database"
//!   references_dir: "database_songs"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use fingerprint::FingerprintConfig;
use index::{ArtifactPaths, CompressionCodec, CompressionConfig, IndexConfig, PersistConfig};
use ingest::IngestConfig;
use matcher::MatchConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole songprint pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct SongprintConfig {
    /// Configuration format version
    #[serde(default = "default_format_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub fingerprint: FingerprintConfig,

    #[serde(default)]
    pub index: IndexYamlConfig,

    #[serde(default)]
    pub matcher: MatchConfig,

    #[serde(default)]
    pub paths: PathsYamlConfig,
}

impl SongprintConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: SongprintConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.ingest
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("ingest: {e}")))?;
        self.fingerprint
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("fingerprint: {e}")))?;
        self.index.validate()?;
        self.matcher
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("matcher: {e}")))?;
        self.paths.validate()?;
        Ok(())
    }

    /// Locations of the persisted index and catalog.
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.paths.database_dir)
    }
}

impl Default for SongprintConfig {
    fn default() -> Self {
        Self {
            version: default_format_version(),
            name: None,
            ingest: IngestConfig::default(),
            fingerprint: FingerprintConfig::default(),
            index: IndexYamlConfig::default(),
            matcher: MatchConfig::default(),
            paths: PathsYamlConfig::default(),
        }
    }
}

/// Index build and storage YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexYamlConfig {
    #[serde(default)]
    pub use_parallel: bool,

    #[serde(default = "default_compression")]
    pub compression: String,

    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

impl IndexYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        let codec = self.codec()?;
        PersistConfig::new()
            .with_compression(CompressionConfig::new(codec, self.compression_level))
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("index: {e}")))
    }

    fn codec(&self) -> Result<CompressionCodec, ConfigLoadError> {
        match self.compression.as_str() {
            "zstd" => Ok(CompressionCodec::Zstd),
            "none" => Ok(CompressionCodec::None),
            other => Err(ConfigLoadError::Validation(format!(
                "index.compression must be one of [\"zstd\", \"none\"] (got {other:?})"
            ))),
        }
    }

    pub fn to_index_config(&self) -> IndexConfig {
        IndexConfig::new().with_parallel(self.use_parallel)
    }

    pub fn to_persist_config(&self) -> Result<PersistConfig, ConfigLoadError> {
        Ok(PersistConfig::new()
            .with_compression(CompressionConfig::new(self.codec()?, self.compression_level)))
    }
}

impl Default for IndexYamlConfig {
    fn default() -> Self {
        Self {
            use_parallel: false,
            compression: default_compression(),
            compression_level: default_compression_level(),
        }
    }
}

/// Filesystem locations YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsYamlConfig {
    /// Directory holding the persisted index and catalog.
    #[serde(default = "default_database_dir")]
    pub database_dir: PathBuf,

    /// Directory of reference recordings used when the database must be built.
    #[serde(default = "default_references_dir")]
    pub references_dir: PathBuf,
}

impl PathsYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.database_dir.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "paths.database_dir must not be empty".to_string(),
            ));
        }
        if self.references_dir.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "paths.references_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PathsYamlConfig {
    fn default() -> Self {
        Self {
            database_dir: default_database_dir(),
            references_dir: default_references_dir(),
        }
    }
}

// Helper functions for serde defaults
fn default_format_version() -> String {
    "1.0".to_string()
}
fn default_compression() -> String {
    "zstd".to_string()
}
fn default_compression_level() -> i32 {
    3
}
fn default_database_dir() -> PathBuf {
    PathBuf::from("database")
}
fn default_references_dir() -> PathBuf {
    PathBuf::from("database_songs")
}
