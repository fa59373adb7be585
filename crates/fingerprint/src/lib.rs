//! # Songprint Fingerprinting
//!
//! This crate turns raw mono PCM into the landmark hashes used by the
//! songprint index and matcher.
//!
//! ## Contract
//!
//! - Input is a mono `f32` sample buffer plus a sample rate in Hz. Stereo
//!   reduction, resampling and decoding belong to the caller.
//! - The API is a pure function of `(samples, sample_rate, config)` with no
//!   I/O and no reliance on clocks or global process state.
//!
//! Invariant: for the same samples, sample rate and [`FingerprintConfig`],
//! the landmarks and hashes are bit identical across runs and threads.
//!
//! ## Core Pipeline
//!
//! 1.  **Spectrogram**: the signal is zero-padded to a whole number of
//!     analysis windows (always at least one pad window), Hann-windowed and
//!     transformed window by window with a forward FFT. Windows do not overlap.
//!
//! 2.  **Constellation map**: every window's magnitude spectrum is reduced to
//!     at most `peaks_per_window` prominent, well-separated peaks. Each peak
//!     becomes a [`Landmark`] `(window index, frequency in Hz)`.
//!
//! 3.  **Pair hashing**: each landmark is paired with the landmarks following
//!     it in list order. Pairs whose time delta falls in the configured range
//!     are packed into a 30-bit [`FingerprintHash`].
//!
//! ## Example Usage
//!
//! ```
//! use fingerprint::{extract, hash, FingerprintConfig};
//!
//! let sample_rate = 8_000;
//! let samples: Vec<f32> = (0..sample_rate * 3)
//!     .map(|i| {
//!         let t = i as f32 / sample_rate as f32;
//!         (2.0 * std::f32::consts::PI * (400.0 + 200.0 * t) * t).sin()
//!     })
//!     .collect();
//!
//! let cfg = FingerprintConfig::default();
//! let landmarks = extract(&samples, sample_rate, &cfg).unwrap();
//! let hashes = hash(&landmarks, None, &cfg).unwrap();
//!
//! assert!(!landmarks.is_empty());
//! assert!(hashes.keys().all(|h| h.raw() < 1 << 30));
//! ```
pub mod config;
mod hashing;
pub mod peaks;
pub mod spectrogram;
pub mod types;

use rayon::prelude::*;
use tracing::debug;

pub use crate::config::{FingerprintConfig, FingerprintError, MAX_WINDOW_DURATION_SECS};
pub use crate::spectrogram::Spectrogram;
pub use crate::types::{FingerprintHash, Fingerprints, HashEntry, Landmark, SongId};
use crate::hashing::hash_landmarks;
use crate::peaks::pick_peaks;

/// Current fingerprint algorithm version for this crate.
pub const FINGERPRINT_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const FINGERPRINT_ALGORITHM: &str = "stft_peaks_pairhash_v1";

/// Reject inputs the extractor cannot process.
pub fn validate_input(samples: &[f32], sample_rate: u32) -> Result<(), FingerprintError> {
    if sample_rate == 0 {
        return Err(FingerprintError::InvalidSampleRate { sample_rate });
    }
    if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
        return Err(FingerprintError::NonFiniteSample { index });
    }
    Ok(())
}

/// Compute the padded, non-overlapping magnitude spectrogram.
pub fn spectrogram(
    samples: &[f32],
    sample_rate: u32,
    cfg: &FingerprintConfig,
) -> Result<Spectrogram, FingerprintError> {
    cfg.validate()?;
    validate_input(samples, sample_rate)?;
    Ok(spectrogram::compute(samples, sample_rate, cfg))
}

/// Extract the constellation map of a mono signal.
///
/// Landmarks are ordered by time bin, then by ascending frequency.
/// Empty input produces an empty map.
pub fn extract(
    samples: &[f32],
    sample_rate: u32,
    cfg: &FingerprintConfig,
) -> Result<Vec<Landmark>, FingerprintError> {
    let spec = spectrogram(samples, sample_rate, cfg)?;

    let per_window = |(time_bin, frame): (usize, &Vec<f32>)| -> Vec<Landmark> {
        pick_peaks(
            frame,
            cfg.min_peak_distance,
            cfg.min_prominence,
            cfg.peaks_per_window,
        )
        .into_iter()
        .map(|peak| Landmark {
            time_bin: time_bin as u32,
            frequency: spec.bin_frequency(peak.bin),
        })
        .collect()
    };

    let windows: Vec<Vec<Landmark>> = if cfg.use_parallel {
        spec.frames.par_iter().enumerate().map(per_window).collect()
    } else {
        spec.frames.iter().enumerate().map(per_window).collect()
    };
    let landmarks: Vec<Landmark> = windows.into_iter().flatten().collect();

    debug!(
        samples = samples.len(),
        sample_rate,
        windows = spec.frames.len(),
        landmarks = landmarks.len(),
        "fingerprint.extract"
    );
    Ok(landmarks)
}

/// Hash a constellation map.
///
/// Collisions inside one call keep the last pair. Accumulating every
/// occurrence across recordings is the index's job.
pub fn hash(
    landmarks: &[Landmark],
    song_id: Option<SongId>,
    cfg: &FingerprintConfig,
) -> Result<Fingerprints, FingerprintError> {
    cfg.validate()?;
    let hashes = hash_landmarks(landmarks, song_id, cfg);
    debug!(
        landmarks = landmarks.len(),
        hashes = hashes.len(),
        song_id = ?song_id,
        "fingerprint.hash"
    );
    Ok(hashes)
}

/// Extract and hash one recording.
pub fn fingerprint(
    samples: &[f32],
    sample_rate: u32,
    song_id: Option<SongId>,
    cfg: &FingerprintConfig,
) -> Result<Fingerprints, FingerprintError> {
    let landmarks = extract(samples, sample_rate, cfg)?;
    hash(&landmarks, song_id, cfg)
}
