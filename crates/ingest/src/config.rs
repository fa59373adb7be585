//! Configuration types for audio ingest.
//!
//! [`IngestConfig`] decides how multi-channel audio is reduced to mono, which
//! files a corpus scan picks up and how large a file may be.
//!
//! ```rust
//! use ingest::{ChannelPolicy, IngestConfig};
//!
//! let config = IngestConfig::default().with_channel_policy(ChannelPolicy::Downmix);
//! config.validate().expect("valid configuration");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a multi-channel file is reduced to the mono signal the fingerprinter needs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPolicy {
    /// Keep the first channel only.
    #[default]
    First,
    /// Average all channels.
    Downmix,
}

/// Runtime configuration for audio ingest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    /// Semantic version of the ingest configuration.
    #[serde(default = "IngestConfig::default_version")]
    pub version: u32,

    #[serde(default)]
    pub channel_policy: ChannelPolicy,

    /// File extensions (without the dot, case-insensitive) picked up by
    /// corpus discovery.
    #[serde(default = "IngestConfig::default_extensions")]
    pub extensions: Vec<String>,

    /// Reject files larger than this many bytes.
    #[serde(default)]
    pub max_file_bytes: Option<u64>,
}

/// Configuration validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("ingest config version must be >= 1 (got {0})")]
    InvalidVersion(u32),
    #[error("at least one file extension is required")]
    NoExtensions,
    #[error("max_file_bytes must be greater than zero")]
    ZeroFileLimit,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
            channel_policy: ChannelPolicy::default(),
            extensions: Self::default_extensions(),
            max_file_bytes: None,
        }
    }
}

impl IngestConfig {
    fn default_version() -> u32 {
        1
    }

    fn default_extensions() -> Vec<String> {
        vec!["wav".to_string()]
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel_policy(mut self, policy: ChannelPolicy) -> Self {
        self.channel_policy = policy;
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_file_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_file_bytes = limit;
        self
    }

    /// True when `ext` is one of the configured extensions.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version < 1 {
            return Err(ConfigError::InvalidVersion(self.version));
        }
        if self.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::NoExtensions);
        }
        if self.max_file_bytes == Some(0) {
            return Err(ConfigError::ZeroFileLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pick_first_channel_of_wav_files() {
        let cfg = IngestConfig::default();
        assert_eq!(cfg.channel_policy, ChannelPolicy::First);
        assert!(cfg.accepts_extension("wav"));
        assert!(cfg.accepts_extension("WAV"));
        assert!(!cfg.accepts_extension("mp3"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = IngestConfig { version: 0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidVersion(0)));
        let cfg = IngestConfig::new().with_extensions(Vec::<String>::new());
        assert_eq!(cfg.validate(), Err(ConfigError::NoExtensions));
        let cfg = IngestConfig::new().with_max_file_bytes(Some(0));
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroFileLimit));
    }

    #[test]
    fn serde_fills_defaults() {
        let cfg: IngestConfig =
            serde_json::from_str(r#"{"version": 1, "channel_policy": "downmix"}"#).unwrap();
        assert_eq!(cfg.channel_policy, ChannelPolicy::Downmix);
        assert_eq!(cfg.extensions, vec!["wav".to_string()]);
        assert_eq!(cfg.max_file_bytes, None);
    }
}
