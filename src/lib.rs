//! Workspace umbrella crate for songprint, a landmark-based audio
//! fingerprinting engine.
//!
//! This crate stitches the stage crates together so callers can go from WAV
//! files on disk to identified songs with a single API:
//!
//! - `ingest`: WAV decoding and corpus discovery
//! - `fingerprint`: spectral landmarks and pair hashes
//! - `index`: inverted index, song catalog and persistence
//! - `matcher`: offset-histogram scoring
//!
//! [`Library`] owns one index and its catalog explicitly; there is no global
//! database state.

pub mod config;

use std::path::Path;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

pub use crate::config::{ConfigLoadError, IndexYamlConfig, PathsYamlConfig, SongprintConfig};
pub use fingerprint::{
    extract, fingerprint as fingerprint_samples, hash, spectrogram, validate_input,
    FingerprintConfig, FingerprintError, FingerprintHash, Fingerprints, HashEntry, Landmark,
    SongId, Spectrogram, FINGERPRINT_ALGORITHM, FINGERPRINT_VERSION, MAX_WINDOW_DURATION_SECS,
};
pub use index::{
    build_index, display_name, load, save, ArtifactPaths, BuildReport, BuiltIndex,
    CompressionCodec, CompressionConfig, FingerprintIndex, IndexConfig, IndexEntry, IndexError,
    PersistConfig, Recording, SkippedRecording, SongCatalog, INDEX_SCHEMA_VERSION,
};
pub use ingest::{
    discover, load_corpus, load_wav, read_wav, AudioClip, ChannelPolicy, Corpus, IngestConfig,
    IngestError,
};
pub use matcher::{
    score_matches, MatchConfig, MatchError, MatchHit, MatchMetrics, MatchResult, Matcher,
};

/// Errors that can occur anywhere in the songprint pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("ingest failure: {0}")]
    Ingest(#[from] IngestError),
    #[error("fingerprinting failed: {0}")]
    Fingerprint(#[from] FingerprintError),
    #[error("index failure: {0}")]
    Index(#[from] IndexError),
    #[error("match failure: {0}")]
    Match(#[from] MatchError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<ConfigLoadError> for PipelineError {
    fn from(value: ConfigLoadError) -> Self {
        PipelineError::Config(value.to_string())
    }
}

/// Hash a decoded clip. Pass `Some(id)` for reference recordings and `None`
/// for query clips.
pub fn fingerprint_clip(
    clip: &AudioClip,
    song_id: Option<SongId>,
    cfg: &FingerprintConfig,
) -> Result<Fingerprints, PipelineError> {
    Ok(fingerprint::fingerprint(
        &clip.samples,
        clip.sample_rate,
        song_id,
        cfg,
    )?)
}

/// How [`Library::load_or_build`] obtained its database.
#[derive(Debug, Clone, PartialEq)]
pub enum LibrarySource {
    /// Both artifacts were present and loaded.
    Loaded,
    /// The database was built from the reference directory and saved.
    Built {
        report: BuildReport,
        /// Reference files that could not be decoded.
        unreadable: Vec<IngestError>,
    },
}

/// A reference database: one index and the catalog built alongside it.
///
/// Cloning is cheap; clones share the same index and catalog.
#[derive(Clone)]
pub struct Library {
    matcher: Matcher,
}

impl Library {
    /// Wrap a built or loaded index/catalog pair.
    pub fn new(
        index: FingerprintIndex,
        catalog: SongCatalog,
        cfg: &SongprintConfig,
    ) -> Result<Self, PipelineError> {
        let matcher = Matcher::new(index, catalog, cfg.fingerprint.clone(), cfg.matcher.clone())?;
        Ok(Self { matcher })
    }

    /// Decode every reference file in `dir` and build a database from it.
    ///
    /// Unreadable files and recordings the fingerprinter rejects are skipped;
    /// they are returned alongside the library for reporting.
    pub fn build_from_dir(
        dir: impl AsRef<Path>,
        cfg: &SongprintConfig,
    ) -> Result<(Self, LibrarySource), PipelineError> {
        cfg.validate()?;
        let dir = dir.as_ref();
        let corpus = load_corpus(dir, &cfg.ingest)?;
        for failure in &corpus.failures {
            warn!(error = %failure, "library_reference_unreadable");
        }

        let recordings = corpus
            .clips
            .into_iter()
            .map(|clip| Recording::new(clip.source, clip.samples, clip.sample_rate))
            .collect();
        let built = build_index(recordings, &cfg.fingerprint, &cfg.index.to_index_config())?;
        let library = Self::new(built.index, built.catalog, cfg)?;
        Ok((
            library,
            LibrarySource::Built {
                report: built.report,
                unreadable: corpus.failures,
            },
        ))
    }

    /// Load a persisted database.
    ///
    /// Fails with [`IndexError::FingerprintConfigMismatch`] when the database
    /// was built with fingerprint settings other than `cfg.fingerprint`.
    pub fn load(paths: &ArtifactPaths, cfg: &SongprintConfig) -> Result<Self, PipelineError> {
        cfg.validate()?;
        let (index, catalog) = load(paths)?;
        index.check_fingerprint_config(&cfg.fingerprint)?;
        Self::new(index, catalog, cfg)
    }

    /// Persist the database. Returns the build id stamped on both artifacts.
    pub fn save(&self, paths: &ArtifactPaths, persist: &PersistConfig) -> Result<u64, PipelineError> {
        Ok(save(self.index(), self.catalog(), paths, persist)?)
    }

    /// Load the database from `cfg.paths.database_dir` when both artifacts
    /// exist and were built with `cfg.fingerprint`; otherwise build it from
    /// `cfg.paths.references_dir` and save it.
    pub fn load_or_build(cfg: &SongprintConfig) -> Result<(Self, LibrarySource), PipelineError> {
        cfg.validate()?;
        let paths = cfg.artifact_paths();
        if paths.both_exist() {
            match Self::load(&paths, cfg) {
                Ok(library) => return Ok((library, LibrarySource::Loaded)),
                Err(PipelineError::Index(IndexError::FingerprintConfigMismatch {
                    index: built_with,
                    config: wanted,
                })) => {
                    warn!(
                        index_settings = format_args!("{built_with:#018x}"),
                        config_settings = format_args!("{wanted:#018x}"),
                        "library_stale_fingerprint_settings_rebuilding"
                    );
                }
                Err(err) => return Err(err),
            }
        } else if paths.index.exists() || paths.catalog.exists() {
            warn!(
                index = %paths.index.display(),
                catalog = %paths.catalog.display(),
                "library_incomplete_artifacts_rebuilding"
            );
        }

        let start = Instant::now();
        let (library, source) = Self::build_from_dir(&cfg.paths.references_dir, cfg)?;
        let build_id = library.save(&paths, &cfg.index.to_persist_config()?)?;
        info!(
            songs = library.len(),
            build_id = format_args!("{build_id:#018x}"),
            elapsed_micros = start.elapsed().as_micros(),
            "library_build_success"
        );
        Ok((library, source))
    }

    /// The matcher serving this library's queries.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Decode a WAV file and identify it.
    pub fn identify_file(
        &self,
        path: impl AsRef<Path>,
        ingest_cfg: &IngestConfig,
    ) -> Result<Vec<MatchHit>, PipelineError> {
        let clip = load_wav(path, ingest_cfg)?;
        self.identify_clip(&clip)
    }

    /// Identify an already decoded clip.
    pub fn identify_clip(&self, clip: &AudioClip) -> Result<Vec<MatchHit>, PipelineError> {
        Ok(self.matcher.identify(&clip.samples, clip.sample_rate)?)
    }

    pub fn index(&self) -> &FingerprintIndex {
        self.matcher.index()
    }

    pub fn catalog(&self) -> &SongCatalog {
        self.matcher.catalog()
    }

    /// Number of songs in the catalog.
    pub fn len(&self) -> usize {
        self.catalog().len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog().is_empty()
    }
}
