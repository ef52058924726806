//! Throughput Benchmark for emberkv
//!
//! Measures the record engine under registration, read, and sweep-scan
//! workloads.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use emberkv::{sweep_once, ExpiryEngine, SweepConfig, DEFAULT_TTL_SECS};
use serde_json::json;
use std::sync::Arc;

/// Benchmark debounced registration
fn bench_add(c: &mut Criterion) {
    let engine = Arc::new(ExpiryEngine::new());

    let mut group = c.benchmark_group("add");
    group.throughput(Throughput::Elements(1));

    group.bench_function("add_marker", |b| {
        let mut i = 0u64;
        b.iter(|| {
            engine.try_once("bench", i, DEFAULT_TTL_SECS).unwrap();
            i += 1;
        });
    });

    group.bench_function("add_object", |b| {
        let mut i = 0u64;
        let value = json!({"role": "admin", "session": "abc123"});
        b.iter(|| {
            engine
                .add("bench_obj", i, value.clone(), DEFAULT_TTL_SECS)
                .unwrap();
            i += 1;
        });
    });

    group.bench_function("add_debounced_repeat", |b| {
        engine.add("bench_dup", "hot", true, 3600.0).unwrap();
        b.iter(|| {
            // Always rejected: measures the debounce check alone.
            black_box(engine.add("bench_dup", "hot", true, 3600.0).unwrap());
        });
    });

    group.finish();
}

/// Benchmark reads
fn bench_get(c: &mut Criterion) {
    let engine = Arc::new(ExpiryEngine::new());

    for i in 0..100_000 {
        engine
            .add("bench", i, json!({"n": i}), 3600.0)
            .unwrap();
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(engine.get("bench", i % 100_000).unwrap());
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(engine.get("missing", i).unwrap());
            i += 1;
        });
    });

    group.bench_function("exists", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(engine.exists("bench", i % 100_000).unwrap());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark a full-index sweep scan over live records
fn bench_sweep_scan(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let engine = Arc::new(ExpiryEngine::new());

    for i in 0..10_000 {
        engine.add("bench", i, true, 3600.0).unwrap();
    }

    let config = SweepConfig {
        full_scan: true,
        ..Default::default()
    };

    let mut group = c.benchmark_group("sweep");
    group.throughput(Throughput::Elements(10_000));

    group.bench_function("scan_10k_live", |b| {
        b.iter(|| {
            let report = rt.block_on(sweep_once(&engine, &config)).unwrap();
            black_box(report);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_add, bench_get, bench_sweep_scan);
criterion_main!(benches);
