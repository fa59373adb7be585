use fingerprint::{FingerprintError, SongId};
use index::IndexError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw scoring outcome for one reference song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub song_id: SongId,
    /// Modal `reference_time - query_time`, in analysis windows.
    pub offset: i64,
    /// Number of query hashes agreeing on `offset`.
    pub score: usize,
}

/// Configuration for the [`Matcher`](crate::Matcher) service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    /// Maximum number of hits returned per query.
    #[serde(default = "MatchConfig::default_max_results")]
    pub max_results: usize,
    /// Hits scoring below this value are dropped.
    #[serde(default = "MatchConfig::default_min_score")]
    pub min_score: usize,
}

impl MatchConfig {
    pub(crate) fn default_max_results() -> usize {
        10
    }

    pub(crate) fn default_min_score() -> usize {
        1
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_min_score(mut self, min_score: usize) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.max_results == 0 {
            return Err(MatchError::InvalidConfig(
                "max_results must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_results: Self::default_max_results(),
            min_score: Self::default_min_score(),
        }
    }
}

/// A [`MatchResult`] resolved against the song catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchHit {
    pub song_id: SongId,
    /// Display name derived from the source path.
    pub name: String,
    /// Source path recorded in the catalog.
    pub path: String,
    /// Offset in analysis windows.
    pub offset: i64,
    /// Offset converted to seconds using the query's window length.
    pub offset_seconds: f64,
    pub score: usize,
}

/// Errors produced by the matching layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// Query extraction or hashing failed.
    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),
    /// The index handed to the matcher is inconsistent with its catalog.
    #[error("index error: {0}")]
    Index(#[from] IndexError),
}
