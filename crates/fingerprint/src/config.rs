//! Configuration and error types for songprint fingerprinting.
//!
//! This module defines the public configuration surface for the extractor and
//! the hasher. It has no I/O or environment-dependent behavior, so the
//! fingerprint is a pure function of `(samples, sample_rate, config)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use xxhash_rust::xxh3::Xxh3;

/// Number of bits reserved for each packed field of a fingerprint hash.
pub const FIELD_BITS: u32 = 10;

/// Longest accepted analysis window, in seconds.
pub const MAX_WINDOW_DURATION_SECS: f64 = 10.0;

/// Configuration for landmark extraction and pair hashing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Configuration schema version.
    ///
    /// Any algorithmic change that can affect the produced hashes must bump
    /// this version, so persisted databases stay comparable.
    pub version: u32,
    /// Duration of one analysis window in seconds.
    ///
    /// The sample count is rounded up to the next even number and is never
    /// smaller than two samples.
    pub window_duration_secs: f64,
    /// Maximum number of landmarks kept per analysis window.
    pub peaks_per_window: usize,
    /// Minimum separation between two peaks of the same window, in bins.
    pub min_peak_distance: usize,
    /// Peaks must have a prominence strictly greater than this value.
    pub min_prominence: f32,
    /// Number of following landmarks (by list position) paired with each anchor.
    pub fan_out: usize,
    /// Smallest accepted anchor/target time delta, in windows (inclusive).
    pub min_time_delta: u32,
    /// Largest accepted anchor/target time delta, in windows (inclusive).
    pub max_time_delta: u32,
    /// Frequency mapped to the top of the 10-bit hash range.
    ///
    /// Frequencies at or above this ceiling are masked to 10 bits.
    pub upper_frequency_hz: f64,
    /// Run per-window peak picking on the rayon pool.
    pub use_parallel: bool,
}

impl FingerprintConfig {
    /// Create a new configuration with the reference defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the analysis window duration in seconds.
    pub fn with_window_duration(mut self, secs: f64) -> Self {
        self.window_duration_secs = secs;
        self
    }

    /// Set the number of peaks kept per window.
    pub fn with_peaks_per_window(mut self, peaks: usize) -> Self {
        self.peaks_per_window = peaks;
        self
    }

    /// Set the minimum peak separation in frequency bins.
    pub fn with_min_peak_distance(mut self, bins: usize) -> Self {
        self.min_peak_distance = bins;
        self
    }

    /// Set how many following landmarks each anchor is paired with.
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Set the accepted inclusive time-delta range.
    pub fn with_time_delta_range(mut self, min: u32, max: u32) -> Self {
        self.min_time_delta = min;
        self.max_time_delta = max;
        self
    }

    /// Set the frequency ceiling used when scaling into the hash range.
    pub fn with_upper_frequency(mut self, hz: f64) -> Self {
        self.upper_frequency_hz = hz;
        self
    }

    /// Enable or disable parallel peak picking.
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Analysis window length in samples for the given sample rate.
    pub fn window_size(&self, sample_rate: u32) -> usize {
        let mut size = (self.window_duration_secs * f64::from(sample_rate)) as usize;
        size += size % 2;
        size.max(2)
    }

    /// Digest of every field that changes the produced hashes.
    ///
    /// `use_parallel` is left out: it changes scheduling, not output. A
    /// database is only valid for queries hashed under the same digest.
    pub fn digest(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.update(&self.version.to_le_bytes());
        hasher.update(&self.window_duration_secs.to_bits().to_le_bytes());
        hasher.update(&(self.peaks_per_window as u64).to_le_bytes());
        hasher.update(&(self.min_peak_distance as u64).to_le_bytes());
        // `+ 0.0` folds -0.0 into 0.0.
        hasher.update(&(self.min_prominence + 0.0).to_bits().to_le_bytes());
        hasher.update(&(self.fan_out as u64).to_le_bytes());
        hasher.update(&self.min_time_delta.to_le_bytes());
        hasher.update(&self.max_time_delta.to_le_bytes());
        hasher.update(&self.upper_frequency_hz.to_bits().to_le_bytes());
        hasher.digest()
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.version < 1 {
            return Err(FingerprintError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if !(self.window_duration_secs > 0.0
            && self.window_duration_secs <= MAX_WINDOW_DURATION_SECS)
        {
            return Err(FingerprintError::InvalidConfig(format!(
                "window_duration_secs must be in (0, {MAX_WINDOW_DURATION_SECS}] (got {})",
                self.window_duration_secs
            )));
        }
        if self.peaks_per_window == 0 {
            return Err(FingerprintError::InvalidConfig(
                "peaks_per_window must be >= 1".into(),
            ));
        }
        if self.min_peak_distance == 0 {
            return Err(FingerprintError::InvalidConfig(
                "min_peak_distance must be >= 1".into(),
            ));
        }
        if !(self.min_prominence.is_finite() && self.min_prominence >= 0.0) {
            return Err(FingerprintError::InvalidConfig(format!(
                "min_prominence must be a finite, non-negative number (got {})",
                self.min_prominence
            )));
        }
        if self.fan_out == 0 {
            return Err(FingerprintError::InvalidConfig("fan_out must be >= 1".into()));
        }
        if self.min_time_delta == 0 || self.min_time_delta > self.max_time_delta {
            return Err(FingerprintError::InvalidConfig(format!(
                "time delta range must satisfy 1 <= min <= max (got {}..={})",
                self.min_time_delta, self.max_time_delta
            )));
        }
        if self.max_time_delta >= 1 << FIELD_BITS {
            return Err(FingerprintError::InvalidConfig(format!(
                "max_time_delta must fit in {FIELD_BITS} bits (got {})",
                self.max_time_delta
            )));
        }
        if !(self.upper_frequency_hz.is_finite() && self.upper_frequency_hz > 0.0) {
            return Err(FingerprintError::InvalidConfig(format!(
                "upper_frequency_hz must be a positive number (got {})",
                self.upper_frequency_hz
            )));
        }
        Ok(())
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            version: 1,
            window_duration_secs: 0.5,
            peaks_per_window: 15,
            min_peak_distance: 200,
            min_prominence: 0.0,
            fan_out: 100,
            min_time_delta: 2,
            max_time_delta: 10,
            upper_frequency_hz: 23_000.0,
            use_parallel: false,
        }
    }
}

/// Errors returned by the fingerprinting pipeline.
///
/// `InvalidSampleRate` and `NonFiniteSample` form the invalid-input family:
/// they are raised before any processing so no partial output escapes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FingerprintError {
    #[error("invalid input: sample rate must be positive (got {sample_rate})")]
    InvalidSampleRate { sample_rate: u32 },

    #[error("invalid input: sample {index} is not a finite number")]
    NonFiniteSample { index: usize },

    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl FingerprintError {
    /// True for errors caused by the caller's samples rather than the config.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            FingerprintError::InvalidSampleRate { .. } | FingerprintError::NonFiniteSample { .. }
        )
    }
}
