use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use songprint::{extract, fingerprint_samples, hash, spectrogram, FingerprintConfig, SongId};

mod common;
use common::song;

/// Benchmark each stage on a 30 second clip at common sample rates
fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint_stages");
    let cfg = FingerprintConfig::default();

    for rate in [8_000u32, 22_050, 44_100] {
        let samples = song(1, 30, rate);
        group.throughput(Throughput::Elements(samples.len() as u64));

        group.bench_with_input(BenchmarkId::new("spectrogram", rate), &samples, |b, s| {
            b.iter(|| spectrogram(black_box(s), rate, &cfg).expect("spectrogram"))
        });
        group.bench_with_input(BenchmarkId::new("extract", rate), &samples, |b, s| {
            b.iter(|| extract(black_box(s), rate, &cfg).expect("extract"))
        });

        let landmarks = extract(&samples, rate, &cfg).expect("extract");
        group.bench_with_input(BenchmarkId::new("hash", rate), &landmarks, |b, l| {
            b.iter(|| hash(black_box(l), Some(SongId(0)), &cfg).expect("hash"))
        });
    }

    group.finish();
}

/// Compare sequential and parallel peak picking on a long recording
fn bench_parallel_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint_parallel");
    let samples = song(2, 180, 44_100);
    group.throughput(Throughput::Elements(samples.len() as u64));

    for use_parallel in [false, true] {
        let cfg = FingerprintConfig::default().with_parallel(use_parallel);
        let label = if use_parallel { "parallel" } else { "sequential" };
        group.bench_function(label, |b| {
            b.iter(|| fingerprint_samples(black_box(&samples), 44_100, None, &cfg).expect("fp"))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stages, bench_parallel_extract);
criterion_main!(benches);
