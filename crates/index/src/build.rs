//! Index build pass: fingerprint a reference corpus into an index and catalog.

use std::time::Instant;

use fingerprint::{fingerprint, validate_input, FingerprintConfig, FingerprintError, Fingerprints, SongId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Level};

use crate::{FingerprintIndex, IndexError, SongCatalog};

/// A decoded mono reference recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// Source path or name; determines the song id order.
    pub path: String,
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Recording {
    pub fn new(path: impl Into<String>, samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            path: path.into(),
            samples,
            sample_rate,
        }
    }
}

/// Build-time options for the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Fingerprint recordings on the rayon pool.
    pub use_parallel: bool,
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }
}

/// A recording left out of the build and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecording {
    pub path: String,
    pub reason: FingerprintError,
}

/// Summary of a build pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub songs: usize,
    pub distinct_hashes: usize,
    pub entries: usize,
    pub skipped: Vec<SkippedRecording>,
}

/// Output of [`build_index`]: the index and catalog always travel together.
#[derive(Debug, Clone)]
pub struct BuiltIndex {
    pub index: FingerprintIndex,
    pub catalog: SongCatalog,
    pub report: BuildReport,
}

/// Build an index and catalog from a reference corpus.
///
/// Recordings are sorted by path and given dense ids in that order. A
/// recording whose samples fail input validation is skipped and reported
/// rather than aborting the build; the remaining recordings keep dense ids.
/// An empty corpus yields an empty index.
pub fn build_index(
    mut corpus: Vec<Recording>,
    fp_cfg: &FingerprintConfig,
    cfg: &IndexConfig,
) -> Result<BuiltIndex, IndexError> {
    fp_cfg.validate()?;
    let start = Instant::now();
    let span = tracing::span!(Level::INFO, "index.build", recordings = corpus.len());
    let _guard = span.enter();

    corpus.sort_by(|a, b| a.path.cmp(&b.path));

    let mut skipped = Vec::new();
    let accepted: Vec<Recording> = corpus
        .into_iter()
        .filter_map(|rec| match validate_input(&rec.samples, rec.sample_rate) {
            Ok(()) => Some(rec),
            Err(reason) => {
                warn!(path = %rec.path, error = %reason, "index_build_skip");
                skipped.push(SkippedRecording {
                    path: rec.path,
                    reason,
                });
                None
            }
        })
        .collect();

    if u32::try_from(accepted.len()).is_err() {
        return Err(IndexError::InvalidConfig(format!(
            "corpus of {} recordings exceeds the song id space",
            accepted.len()
        )));
    }
    if accepted.is_empty() {
        warn!(skipped = skipped.len(), "index_build_empty_corpus");
    }

    let fingerprint_one = |(pos, rec): (usize, &Recording)| -> Result<Fingerprints, FingerprintError> {
        fingerprint(&rec.samples, rec.sample_rate, Some(SongId(pos as u32)), fp_cfg)
    };
    let per_song: Vec<Result<Fingerprints, FingerprintError>> = if cfg.use_parallel {
        accepted.par_iter().enumerate().map(fingerprint_one).collect()
    } else {
        accepted.iter().enumerate().map(fingerprint_one).collect()
    };

    // Single writer: merge in song id order.
    let mut index = FingerprintIndex::new();
    index.set_fingerprint_config(fp_cfg);
    let mut catalog = SongCatalog::new();
    for (pos, (rec, hashes)) in accepted.into_iter().zip(per_song).enumerate() {
        let song_id = SongId(pos as u32);
        let hashes = hashes?;
        index.insert_recording(song_id, &hashes);
        catalog.insert(song_id, rec.path);
    }

    let report = BuildReport {
        songs: catalog.len(),
        distinct_hashes: index.len(),
        entries: index.entry_count(),
        skipped,
    };
    info!(
        songs = report.songs,
        distinct_hashes = report.distinct_hashes,
        entries = report.entries,
        skipped = report.skipped.len(),
        parallel = cfg.use_parallel,
        elapsed_micros = start.elapsed().as_micros(),
        "index_build_success"
    );

    Ok(BuiltIndex {
        index,
        catalog,
        report,
    })
}
