//! # Songprint Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` turns a query clip into a ranked list of reference songs. It
//! sits on top of the `fingerprint` crate (which produces the query's hash
//! set) and the `index` crate (which holds the reference occurrences).
//!
//! ## Scoring
//!
//! Every query hash present in the index contributes one piece of
//! [`Evidence`] per reference occurrence. For each song, the evidence is
//! histogrammed by `ref_time - sample_time`; a real match piles up on one
//! offset while chance collisions scatter. The song's score is the height of
//! its tallest bucket and its offset is that bucket's key.
//!
//! Ties are deterministic: between offsets, the first one encountered
//! (query hashes ascending, index buckets in insertion order) wins; between
//! songs with equal scores, the lower [`SongId`](fingerprint::SongId) ranks
//! first.
//!
//! ## Core Types
//!
//! - [`score_matches`]: the pure scorer, returning [`MatchResult`] values.
//! - [`Matcher`]: owns a shared index and catalog, applies a
//!   [`MatchConfig`] (`max_results`, `min_score`) and resolves results into
//!   [`MatchHit`] values with names and offsets in seconds.
//!
//! ## Example Usage
//!
//! ```
//! use fingerprint::FingerprintConfig;
//! use index::{build_index, IndexConfig, Recording};
//! use matcher::{MatchConfig, Matcher};
//!
//! let sample_rate = 8_000;
//! let clip: Vec<f32> = (0..sample_rate * 4)
//!     .map(|i| {
//!         let t = i as f32 / sample_rate as f32;
//!         let f = 300.0 + 450.0 * (t * 2.0).floor();
//!         (2.0 * std::f32::consts::PI * f * t).sin()
//!     })
//!     .collect();
//!
//! let built = build_index(
//!     vec![Recording::new("songs/Blue-Train.wav", clip.clone(), sample_rate)],
//!     &FingerprintConfig::default(),
//!     &IndexConfig::default(),
//! )
//! .unwrap();
//! let matcher = Matcher::new(
//!     built.index,
//!     built.catalog,
//!     FingerprintConfig::default(),
//!     MatchConfig::default(),
//! )
//! .unwrap();
//!
//! let best = matcher.best_match(&clip, sample_rate).unwrap().unwrap();
//! assert_eq!(best.name, "Blue Train");
//! assert_eq!(best.offset, 0);
//! ```
//!
//! ## Observability
//!
//! Attach a [`MatchMetrics`] implementation with [`Matcher::with_metrics`]
//! to record per-query latency and hit counts.

pub mod engine;
pub mod metrics;
pub mod score;
pub mod types;

pub use crate::engine::Matcher;
pub use crate::metrics::MatchMetrics;
pub use crate::score::{collect_evidence, score_matches, Evidence};
pub use crate::types::{MatchConfig, MatchError, MatchHit, MatchResult};
