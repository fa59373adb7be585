//! Shared fixtures for the songprint integration tests.

#![allow(dead_code)]

use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use songprint::SongprintConfig;

pub const SAMPLE_RATE: u32 = 8_000;

/// Three tones per half-second window, picked from `seed` and the window index.
pub fn song(seed: u32, secs: u32) -> Vec<f32> {
    let window = SAMPLE_RATE as usize / 2;
    let n = (secs * SAMPLE_RATE) as usize;
    (0..n)
        .map(|i| {
            let w = (i / window) as u32;
            let t = i as f32 / SAMPLE_RATE as f32;
            (0..3u32)
                .map(|k| {
                    let freq = 200 + (seed * 911 + w * 7919 + k * 1237) % 3400;
                    (2.0 * PI * freq as f32 * t).sin() / 3.0
                })
                .sum()
        })
        .collect()
}

/// Quantize to 16-bit PCM the way a WAV writer would.
pub fn to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|s| (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
        .collect()
}

/// Write mono 16-bit PCM at [`SAMPLE_RATE`].
pub fn write_wav(path: &Path, pcm: &[i16]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for &s in pcm {
        writer.write_sample(s).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

/// Write `count` songs named `track-<seed>.wav` into `dir`, each `secs` long.
pub fn write_references(dir: &Path, count: u32, secs: u32) -> Vec<PathBuf> {
    std::fs::create_dir_all(dir).expect("create references dir");
    (1..=count)
        .map(|seed| {
            let path = dir.join(format!("track-{seed}.wav"));
            write_wav(&path, &to_pcm16(&song(seed, secs)));
            path
        })
        .collect()
}

/// Pipeline config rooted in `root`, with references in `root/refs` and the
/// database in `root/db`.
pub fn config_in(root: &Path) -> SongprintConfig {
    let mut cfg = SongprintConfig::default();
    cfg.paths.references_dir = root.join("refs");
    cfg.paths.database_dir = root.join("db");
    cfg
}
