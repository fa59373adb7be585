//! Landmark pair hashing.
//!
//! Each landmark is used as an anchor and paired with the landmarks that
//! follow it in list order. A pair contributes a hash when its time delta
//! lies within the configured range.

use crate::config::{FingerprintConfig, FIELD_BITS};
use crate::types::{FingerprintHash, Fingerprints, HashEntry, Landmark, SongId};

/// Scale a frequency into the 10-bit hash range.
///
/// Values at or above `upper_frequency_hz` wrap through the 10-bit mask
/// rather than spilling into the neighbouring field.
#[inline]
pub(crate) fn quantize_frequency(freq: f64, upper_frequency_hz: f64) -> u32 {
    let scaled = freq * f64::from(1u32 << FIELD_BITS) / upper_frequency_hz;
    // `as` saturates negatives and NaN to zero.
    (scaled as u32) & ((1 << FIELD_BITS) - 1)
}

/// Hash landmark pairs. A colliding hash later in the same call overwrites
/// the earlier entry.
pub(crate) fn hash_landmarks(
    landmarks: &[Landmark],
    song_id: Option<SongId>,
    cfg: &FingerprintConfig,
) -> Fingerprints {
    let mut hashes = Fingerprints::new();

    for (idx, anchor) in landmarks.iter().enumerate() {
        let end = (idx + 1 + cfg.fan_out).min(landmarks.len());
        for target in &landmarks[idx + 1..end] {
            let Some(time_delta) = target.time_bin.checked_sub(anchor.time_bin) else {
                continue;
            };
            if time_delta < cfg.min_time_delta || time_delta > cfg.max_time_delta {
                continue;
            }

            let hash = FingerprintHash::pack(
                quantize_frequency(anchor.frequency, cfg.upper_frequency_hz),
                quantize_frequency(target.frequency, cfg.upper_frequency_hz),
                time_delta,
            );
            hashes.insert(
                hash,
                HashEntry {
                    time_bin: anchor.time_bin,
                    song_id,
                },
            );
        }
    }

    hashes
}
