use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use songprint::{build_index, FingerprintConfig, IndexConfig};

mod common;
use common::{corpus, library, song, SAMPLE_RATE};

/// Benchmark identification of a 5 second excerpt against growing libraries
fn bench_identify_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("identify_scale");
    group.sample_size(20);

    for songs in [10u32, 100, 500] {
        let lib = library(songs, 30);
        let full = song(songs / 2, 30, SAMPLE_RATE);
        let start = 10 * SAMPLE_RATE as usize;
        let excerpt = full[start..start + 5 * SAMPLE_RATE as usize].to_vec();

        group.bench_with_input(BenchmarkId::from_parameter(songs), &excerpt, |b, clip| {
            b.iter(|| {
                lib.matcher()
                    .identify(black_box(clip), SAMPLE_RATE)
                    .expect("identify")
            })
        });
    }

    group.finish();
}

/// Scoring only, with the query hashes computed up front
fn bench_score(c: &mut Criterion) {
    let lib = library(200, 30);
    let query = lib
        .matcher()
        .query_hashes(&song(7, 10, SAMPLE_RATE), SAMPLE_RATE)
        .expect("query hashes");

    c.bench_function("score_200_songs", |b| {
        b.iter(|| lib.matcher().score(black_box(&query)))
    });
}

/// Index build throughput, sequential versus rayon
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    group.sample_size(10);
    let recordings = corpus(50, 30);
    group.throughput(Throughput::Elements(recordings.len() as u64));

    for use_parallel in [false, true] {
        let cfg = IndexConfig::new().with_parallel(use_parallel);
        let label = if use_parallel { "parallel" } else { "sequential" };
        group.bench_function(label, |b| {
            b.iter(|| {
                build_index(
                    black_box(recordings.clone()),
                    &FingerprintConfig::default(),
                    &cfg,
                )
                .expect("build")
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_identify_scale, bench_score, bench_build);
criterion_main!(benches);
