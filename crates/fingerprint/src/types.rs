//! Landmark and hash types for the songprint fingerprint layer.
//!
//! The packed hash layout is part of the persisted database format: any
//! incompatible change must result in a new `FINGERPRINT_VERSION`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::FIELD_BITS;

const FIELD_MASK: u32 = (1 << FIELD_BITS) - 1;

/// Dense song identifier assigned at index build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub u32);

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A spectral peak in the constellation map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Index of the analysis window the peak was found in.
    pub time_bin: u32,
    /// Frequency of the peak bin in Hz.
    pub frequency: f64,
}

/// 30-bit hash packed from an (anchor, target) landmark pair.
///
/// Layout: `anchor_freq | target_freq << 10 | time_delta << 20`, each field
/// 10 bits wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerprintHash(u32);

impl FingerprintHash {
    /// Exclusive upper bound of every packed value.
    pub const LIMIT: u32 = 1 << (3 * FIELD_BITS);

    /// Pack three fields; each is masked to 10 bits first.
    pub fn pack(anchor_freq: u32, target_freq: u32, time_delta: u32) -> Self {
        Self(
            (anchor_freq & FIELD_MASK)
                | ((target_freq & FIELD_MASK) << FIELD_BITS)
                | ((time_delta & FIELD_MASK) << (2 * FIELD_BITS)),
        )
    }

    /// Rebuild a hash from its raw value, rejecting anything wider than 30 bits.
    pub fn from_raw(raw: u32) -> Option<Self> {
        (raw < Self::LIMIT).then_some(Self(raw))
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn anchor_freq(self) -> u32 {
        self.0 & FIELD_MASK
    }

    pub fn target_freq(self) -> u32 {
        (self.0 >> FIELD_BITS) & FIELD_MASK
    }

    pub fn time_delta(self) -> u32 {
        (self.0 >> (2 * FIELD_BITS)) & FIELD_MASK
    }
}

impl fmt::Display for FingerprintHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Value stored for a hash produced by a single hashing call.
///
/// `song_id` is `None` for query clips and `Some` for reference recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashEntry {
    /// Time bin of the anchor landmark.
    pub time_bin: u32,
    pub song_id: Option<SongId>,
}

/// Hashes of one recording, ordered by hash value.
pub type Fingerprints = BTreeMap<FingerprintHash, HashEntry>;
