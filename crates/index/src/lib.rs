//! # Songprint Index
//!
//! This crate holds the reference side of songprint: an in-memory inverted
//! index from [`FingerprintHash`] to every place that hash occurs in the
//! reference corpus, and the [`SongCatalog`] that names the songs.
//!
//! ## Core Features
//!
//! - **Append-only index**: [`FingerprintIndex::insert_recording`] appends one
//!   [`IndexEntry`] per hash. A hash shared by many recordings (or by many
//!   instants of one recording across builds) keeps every occurrence.
//! - **Deterministic build**: [`build_index`] sorts the corpus by path,
//!   assigns dense [`SongId`]s in that order and fingerprints the recordings,
//!   optionally on the rayon pool. Merging is a single-writer reduce, so the
//!   index is identical whether or not the build ran in parallel.
//! - **Paired persistence**: [`save`] writes the index (bincode, optionally
//!   zstd-compressed) and the catalog (JSON) as two artifacts stamped with a
//!   shared build id. [`load`] refuses a missing, mismatched or referentially
//!   broken pair.
//!
//! ## Example Usage
//!
//! ```
//! use fingerprint::FingerprintConfig;
//! use index::{build_index, IndexConfig, Recording};
//!
//! let sample_rate = 8_000;
//! let tone = |freq: f32| -> Vec<f32> {
//!     (0..sample_rate * 4)
//!         .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
//!         .collect()
//! };
//!
//! let corpus = vec![
//!     Recording::new("songs/b.wav", tone(880.0), sample_rate),
//!     Recording::new("songs/a.wav", tone(440.0), sample_rate),
//! ];
//!
//! let built = build_index(corpus, &FingerprintConfig::default(), &IndexConfig::default()).unwrap();
//! assert_eq!(built.catalog.len(), 2);
//! assert_eq!(built.catalog.source(fingerprint::SongId(0)), Some("songs/a.wav"));
//! ```

mod build;
mod catalog;
mod persist;

use bincode::error::{DecodeError, EncodeError};
use fingerprint::{FingerprintConfig, FingerprintError, FingerprintHash, Fingerprints, SongId};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::build::{build_index, BuildReport, BuiltIndex, IndexConfig, Recording, SkippedRecording};
pub use crate::catalog::{display_name, SongCatalog};
pub use crate::persist::{
    load, save, ArtifactPaths, CompressionCodec, CompressionConfig, PersistConfig,
    CATALOG_FILE_NAME, INDEX_FILE_NAME,
};

/// Bump this value whenever the persisted artifact layout changes.
pub const INDEX_SCHEMA_VERSION: u16 = 2;

/// One reference occurrence of a hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Anchor time bin within the reference recording.
    pub time_bin: u32,
    pub song_id: SongId,
}

/// Errors produced while building, saving or loading an index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("invalid index config: {0}")]
    InvalidConfig(String),
    #[error("fingerprinting failed: {0}")]
    Fingerprint(#[from] FingerprintError),
    #[error("i/o error: {0}")]
    Io(String),
    #[error("serialization encode error: {0}")]
    Encode(String),
    #[error("serialization decode error: {0}")]
    Decode(String),
    #[error("missing artifact: {0}")]
    MissingArtifact(String),
    #[error("index and catalog come from different builds (index {index:#x}, catalog {catalog:#x})")]
    ArtifactMismatch { index: u64, catalog: u64 },
    #[error("unsupported artifact schema version {found}; expected {expected}")]
    UnsupportedSchema { found: u16, expected: u16 },
    #[error("index references song id {song_id} which is absent from the catalog")]
    IndexCatalogMismatch { song_id: SongId },
    #[error("index was built with fingerprint settings {index:#x} but queries use {config:#x}")]
    FingerprintConfigMismatch { index: u64, config: u64 },
}

impl From<EncodeError> for IndexError {
    fn from(e: EncodeError) -> Self {
        IndexError::Encode(e.to_string())
    }
}

impl From<DecodeError> for IndexError {
    fn from(e: DecodeError) -> Self {
        IndexError::Decode(e.to_string())
    }
}

impl From<std::io::Error> for IndexError {
    fn from(e: std::io::Error) -> Self {
        IndexError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(e: serde_json::Error) -> Self {
        IndexError::Decode(e.to_string())
    }
}

/// Inverted index from fingerprint hash to reference occurrences.
///
/// Read-only once built; share it behind an `Arc` for concurrent queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FingerprintIndex {
    buckets: HashMap<FingerprintHash, Vec<IndexEntry>>,
    entries: usize,
    /// [`FingerprintConfig::digest`] of the settings the entries were hashed with.
    fingerprint_digest: Option<u64>,
}

impl FingerprintIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every hash of one recording under `song_id`.
    ///
    /// Entries are appended, never overwritten. The `song_id` carried inside
    /// each [`fingerprint::HashEntry`] is ignored in favour of the argument.
    pub fn insert_recording(&mut self, song_id: SongId, hashes: &Fingerprints) {
        self.buckets.reserve(hashes.len());
        for (hash, entry) in hashes {
            self.push(
                *hash,
                IndexEntry {
                    time_bin: entry.time_bin,
                    song_id,
                },
            );
        }
    }

    /// Append a single occurrence.
    pub fn push(&mut self, hash: FingerprintHash, entry: IndexEntry) {
        self.buckets.entry(hash).or_default().push(entry);
        self.entries += 1;
    }

    /// All reference occurrences of `hash`, in insertion order.
    pub fn get(&self, hash: &FingerprintHash) -> &[IndexEntry] {
        self.buckets.get(hash).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, hash: &FingerprintHash) -> bool {
        self.buckets.contains_key(hash)
    }

    /// Number of distinct hashes.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of stored occurrences across all buckets.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Iterate buckets in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (FingerprintHash, &[IndexEntry])> {
        self.buckets.iter().map(|(h, e)| (*h, e.as_slice()))
    }

    /// Record the settings the entries were hashed with.
    pub fn set_fingerprint_config(&mut self, cfg: &FingerprintConfig) {
        self.fingerprint_digest = Some(cfg.digest());
    }

    /// Digest of the build settings, if recorded.
    pub fn fingerprint_digest(&self) -> Option<u64> {
        self.fingerprint_digest
    }

    /// Check that queries hashed with `cfg` are comparable with this index.
    ///
    /// An index without recorded settings accepts any config.
    pub fn check_fingerprint_config(&self, cfg: &FingerprintConfig) -> Result<(), IndexError> {
        match self.fingerprint_digest {
            Some(index) if index != cfg.digest() => Err(IndexError::FingerprintConfigMismatch {
                index,
                config: cfg.digest(),
            }),
            _ => Ok(()),
        }
    }

    /// Check that every song id referenced by the index exists in `catalog`.
    pub fn check_catalog(&self, catalog: &SongCatalog) -> Result<(), IndexError> {
        let missing = self
            .buckets
            .values()
            .flatten()
            .map(|entry| entry.song_id)
            .filter(|id| !catalog.contains(*id))
            .min();
        match missing {
            Some(song_id) => Err(IndexError::IndexCatalogMismatch { song_id }),
            None => Ok(()),
        }
    }
}
