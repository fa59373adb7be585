//! Concurrency and thread safety tests for songprint

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

mod common;

use common::{song, SAMPLE_RATE};
use songprint::{
    build_index, fingerprint_samples, AudioClip, FingerprintConfig, IndexConfig, Library,
    MatchMetrics, Recording, SongId, SongprintConfig,
};

fn library(songs: u32) -> Library {
    let corpus = (1..=songs)
        .map(|seed| Recording::new(format!("track-{seed}.wav"), song(seed, 6), SAMPLE_RATE))
        .collect();
    let built = build_index(corpus, &FingerprintConfig::default(), &IndexConfig::default())
        .expect("build");
    Library::new(built.index, built.catalog, &SongprintConfig::default()).expect("library")
}

fn clip_of(seed: u32) -> AudioClip {
    AudioClip {
        source: format!("query-{seed}"),
        samples: song(seed, 6),
        sample_rate: SAMPLE_RATE,
        channels: 1,
    }
}

#[test]
fn concurrent_fingerprinting_same_config() {
    let cfg = Arc::new(FingerprintConfig::default());
    let samples = Arc::new(song(9, 4));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cfg = Arc::clone(&cfg);
            let samples = Arc::clone(&samples);
            thread::spawn(move || {
                fingerprint_samples(&samples, SAMPLE_RATE, None, &cfg).expect("fingerprint")
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first = &results[0];
    for (i, result) in results.iter().enumerate().skip(1) {
        assert_eq!(first, result, "thread {i} produced different hashes");
    }
}

#[test]
fn concurrent_identify_through_shared_library() {
    let library = library(4);

    let handles: Vec<_> = (0..16u32)
        .map(|i| {
            let library = library.clone();
            let seed = i % 4 + 1;
            thread::spawn(move || {
                let hits = library.identify_clip(&clip_of(seed)).expect("identify");
                (seed, hits)
            })
        })
        .collect();

    for handle in handles {
        let (seed, hits) = handle.join().unwrap();
        let best = hits.first().expect("a hit");
        assert_eq!(best.song_id, SongId(seed - 1));
        assert_eq!(best.offset, 0);
    }
}

#[test]
fn concurrent_and_sequential_answers_agree() {
    let library = library(3);
    let sequential: Vec<_> = (1..=3)
        .map(|seed| library.identify_clip(&clip_of(seed)).expect("identify"))
        .collect();

    let concurrent: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (1..=3)
            .map(|seed| {
                let library = &library;
                scope.spawn(move || library.identify_clip(&clip_of(seed)).expect("identify"))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}

#[derive(Default)]
struct CountingMetrics {
    queries: AtomicUsize,
}

impl MatchMetrics for CountingMetrics {
    fn record_match(&self, _query_hashes: usize, _latency: Duration, _hit_count: usize) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn metrics_observer_sees_every_concurrent_query() {
    let lib = library(2);
    let metrics = Arc::new(CountingMetrics::default());
    let matcher = lib.matcher().clone().with_metrics(metrics.clone());

    thread::scope(|scope| {
        for i in 0..10u32 {
            let matcher = &matcher;
            scope.spawn(move || {
                let clip = clip_of(i % 2 + 1);
                matcher
                    .identify(&clip.samples, clip.sample_rate)
                    .expect("identify");
            });
        }
    });

    assert_eq!(metrics.queries.load(Ordering::Relaxed), 10);
}
