//! Report Performance Benchmarks
//!
//! Benchmarks for the fixed query sequence over the in-memory engine.
//! These benchmarks measure the performance of:
//! - A full report run over the sample dataset
//! - Text rendering of a finished report
//! - Ranked queries (sort + limit)

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geoquery::{render_text, run_report, GeographyEngine, MemoryEngine, RankBy, SeedData};

fn seeded_engine(runtime: &tokio::runtime::Runtime) -> MemoryEngine {
    let engine = MemoryEngine::new("Geography");
    runtime
        .block_on(engine.seed(&SeedData::sample().expect("sample dataset"), false))
        .expect("Failed to seed");
    engine
}

fn bench_full_report(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let engine = seeded_engine(&runtime);

    c.bench_function("memory_full_report", |b| {
        b.iter(|| {
            let report = runtime.block_on(run_report(black_box(&engine)));
            assert!(report.is_ok());
            report
        });
    });
}

fn bench_render_text(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let engine = seeded_engine(&runtime);
    let report = runtime.block_on(run_report(&engine)).expect("Failed to run report");

    c.bench_function("render_text", |b| {
        b.iter(|| render_text(black_box(&report)));
    });
}

fn bench_top_by_population(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let engine = seeded_engine(&runtime);

    c.bench_function("memory_top_5_by_population", |b| {
        b.iter(|| {
            runtime.block_on(engine.top_country_names(black_box(RankBy::Population), black_box(5)))
        });
    });
}

criterion_group!(benches, bench_full_report, bench_render_text, bench_top_by_population);
criterion_main!(benches);
