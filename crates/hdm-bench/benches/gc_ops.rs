//! Criterion micro-benchmarks for garbage collection.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use hdm_bench::{build, build_with_garbage, reference_profile};

/// Benchmark: Mark only, everything reachable.
fn bench_mark_reference(c: &mut Criterion) {
    let (ser, _) = build(&reference_profile());

    c.bench_function("gc_mark_reference", |b| {
        b.iter(|| black_box(ser.reachable().len()));
    });
}

/// Benchmark: Full collection sweeping three unrooted copies.
fn bench_collect_with_garbage(c: &mut Criterion) {
    let spec = reference_profile();

    c.bench_function("gc_collect_3x_garbage", |b| {
        b.iter_batched(
            || {
                let mut ser = build_with_garbage(&spec, 3);
                ser.set_gc_enabled(true);
                ser
            },
            |mut ser| black_box(ser.collect_garbage()),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_mark_reference, bench_collect_with_garbage);
criterion_main!(benches);
