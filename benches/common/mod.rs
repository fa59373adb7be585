//! Common utilities for songprint benchmarks
//!
//! Synthetic songs are deterministic tone patterns, so runs are comparable
//! without shipping audio fixtures.

#![allow(dead_code)]

use std::f32::consts::PI;

use songprint::{
    build_index, FingerprintConfig, IndexConfig, Library, Recording, SongprintConfig,
};

pub const SAMPLE_RATE: u32 = 8_000;

/// Three tones per half-second window, picked from `seed` and the window index.
pub fn song(seed: u32, secs: u32, sample_rate: u32) -> Vec<f32> {
    let window = sample_rate as usize / 2;
    let n = (secs * sample_rate) as usize;
    (0..n)
        .map(|i| {
            let w = (i / window) as u32;
            let t = i as f32 / sample_rate as f32;
            (0..3u32)
                .map(|k| {
                    let freq = 200 + (seed * 911 + w * 7919 + k * 1237) % 3400;
                    (2.0 * PI * freq as f32 * t).sin() / 3.0
                })
                .sum()
        })
        .collect()
}

/// `count` synthetic recordings of `secs` seconds each.
pub fn corpus(count: u32, secs: u32) -> Vec<Recording> {
    (0..count)
        .map(|seed| {
            Recording::new(
                format!("bench/track-{seed:04}.wav"),
                song(seed, secs, SAMPLE_RATE),
                SAMPLE_RATE,
            )
        })
        .collect()
}

/// Library over `count` synthetic songs.
pub fn library(count: u32, secs: u32) -> Library {
    let built = build_index(
        corpus(count, secs),
        &FingerprintConfig::default(),
        &IndexConfig::new().with_parallel(true),
    )
    .expect("build index");
    Library::new(built.index, built.catalog, &SongprintConfig::default()).expect("library")
}
