//! Decoded audio produced by the ingest layer.

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Mono PCM decoded from one file, normalised to `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    /// Path the clip was read from; becomes the catalog source.
    pub source: String,
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the file before reduction to mono.
    pub channels: u16,
}

impl AudioClip {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Outcome of loading every file of a corpus directory.
///
/// Files that fail to load are collected in `failures` instead of aborting
/// the whole load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    /// Successfully decoded clips in sorted path order.
    pub clips: Vec<AudioClip>,
    pub failures: Vec<IngestError>,
}

impl Corpus {
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
