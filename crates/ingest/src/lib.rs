//! Songprint Ingest Layer
//!
//! This is where audio enters songprint. We read WAV files, reduce them to
//! the mono `f32` signal the fingerprinter expects and hand back an
//! [`AudioClip`] tagged with the path it came from.
//!
//! ## What we do here
//!
//! - **Decode** - 8/16/24/32-bit integer and 32-bit float WAV via `hound`.
//!   Integers are scaled into `[-1.0, 1.0]`.
//! - **Reduce channels** - keep the first channel or average them all, per
//!   [`ChannelPolicy`].
//! - **Discover corpora** - list the audio files of a directory in sorted
//!   order so song ids are reproducible.
//! - **Isolate failures** - one unreadable file in a corpus is reported,
//!   not fatal.
//!
//! ## Example
//!
//! ```no_run
//! use ingest::{load_corpus, IngestConfig};
//!
//! let corpus = load_corpus("database_songs", &IngestConfig::default()).unwrap();
//! for clip in &corpus.clips {
//!     println!("{} {:.1}s", clip.source, clip.duration_secs());
//! }
//! for failure in &corpus.failures {
//!     eprintln!("skipped: {failure}");
//! }
//! ```
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use hound::WavReader;
use tracing::{info, warn, Level};

mod config;
mod error;
mod types;
mod wav;

pub use crate::config::{ChannelPolicy, ConfigError, IngestConfig};
pub use crate::error::IngestError;
pub use crate::types::{AudioClip, Corpus};
pub use crate::wav::to_mono;

/// Load one WAV file as a mono clip.
pub fn load_wav(path: impl AsRef<Path>, cfg: &IngestConfig) -> Result<AudioClip, IngestError> {
    let path = path.as_ref();
    let start = Instant::now();
    let span = tracing::span!(Level::INFO, "ingest.load_wav", path = %path.display());
    let _guard = span.enter();

    match load_wav_inner(path, cfg) {
        Ok(clip) => {
            info!(
                sample_rate = clip.sample_rate,
                channels = clip.channels,
                samples = clip.samples.len(),
                elapsed_micros = start.elapsed().as_micros(),
                "ingest_success"
            );
            Ok(clip)
        }
        Err(err) => {
            warn!(error = %err, elapsed_micros = start.elapsed().as_micros(), "ingest_failure");
            Err(err)
        }
    }
}

fn load_wav_inner(path: &Path, cfg: &IngestConfig) -> Result<AudioClip, IngestError> {
    if let Some(limit) = cfg.max_file_bytes {
        let bytes = fs::metadata(path).map_err(|e| IngestError::io(path, e))?.len();
        if bytes > limit {
            return Err(IngestError::TooLarge {
                path: path.to_path_buf(),
                bytes,
                limit,
            });
        }
    }
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    read_wav(BufReader::new(file), path, cfg)
}

/// Decode WAV data from any reader. `source` names the clip.
pub fn read_wav<R: Read>(
    reader: R,
    source: impl AsRef<Path>,
    cfg: &IngestConfig,
) -> Result<AudioClip, IngestError> {
    let source = source.as_ref();
    let reader = WavReader::new(reader).map_err(|e| IngestError::wav(source, e))?;
    wav::decode(reader, source, cfg)
}

/// List the audio files directly inside `dir`, sorted by path.
///
/// Only regular files whose extension is accepted by `cfg` are returned;
/// subdirectories are not descended into.
pub fn discover(dir: impl AsRef<Path>, cfg: &IngestConfig) -> Result<Vec<PathBuf>, IngestError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(IngestError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| IngestError::io(dir, e))? {
        let path = entry.map_err(|e| IngestError::io(dir, e))?.path();
        let accepted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| cfg.accepts_extension(ext));
        if accepted && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load every audio file of `dir`.
///
/// Fails only when the directory itself cannot be listed; per-file errors
/// are collected in [`Corpus::failures`].
pub fn load_corpus(dir: impl AsRef<Path>, cfg: &IngestConfig) -> Result<Corpus, IngestError> {
    let dir = dir.as_ref();
    let start = Instant::now();
    let paths = discover(dir, cfg)?;

    let mut corpus = Corpus::default();
    for path in &paths {
        match load_wav(path, cfg) {
            Ok(clip) => corpus.clips.push(clip),
            Err(err) => corpus.failures.push(err),
        }
    }

    if corpus.is_empty() {
        warn!(dir = %dir.display(), failures = corpus.failures.len(), "ingest_empty_corpus");
    }
    info!(
        dir = %dir.display(),
        files = paths.len(),
        loaded = corpus.clips.len(),
        failures = corpus.failures.len(),
        elapsed_micros = start.elapsed().as_micros(),
        "ingest_corpus_success"
    );
    Ok(corpus)
}
