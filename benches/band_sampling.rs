// SPDX-License-Identifier: MPL-2.0
//! Benchmarks for the audio visualizer pipeline.
//!
//! Measures the performance of:
//! - Reducing analyser bins to visualizer bands
//! - One analysis frame (window + FFT + smoothing) through the graph

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use inline_player::player::{reduce_bands, AudioContextApi, AudioGraph, ElementId, SoftwareAnalyser};
use std::hint::black_box;

fn tone(len: usize) -> Vec<f32> {
    (0..len).map(|i| 0.4 * (i as f32 * 0.05).sin()).collect()
}

/// Benchmark band reduction for typical band counts.
fn bench_reduce_bands(c: &mut Criterion) {
    let mut group = c.benchmark_group("band_sampling");
    let bins: Vec<u8> = (0..1024).map(|i| (i % 256) as u8).collect();

    for bands in [3_usize, 16, 64] {
        group.bench_with_input(BenchmarkId::new("reduce_bands", bands), &bands, |b, &n| {
            b.iter(|| black_box(reduce_bands(black_box(&bins), n)));
        });
    }

    group.finish();
}

/// Benchmark a full analysis frame: feeding samples then sampling bands.
fn bench_analysis_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("band_sampling");
    let samples = tone(2048);

    let mut analyser = SoftwareAnalyser::new();
    analyser.resume();
    let mut graph = AudioGraph::new(Box::new(analyser));
    let _handle = graph.attach(ElementId(1));

    group.bench_function("feed_and_sample", |b| {
        b.iter(|| {
            graph.feed(black_box(&samples));
            black_box(graph.sample_bands(3));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_reduce_bands, bench_analysis_frame);
criterion_main!(benches);
