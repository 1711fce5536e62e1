//! Benchmarks for the pro-rata allocator.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark
//! cargo bench -- scaling
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use prorata_allocator::engine::{AllocationEngine, EngineConfig};
use prorata_allocator::types::AllocationReceipt;
use prorata_allocator::{AllocationRequest, Claimant};
use rust_decimal::Decimal;

// ============================================================================
// HELPER FUNCTIONS - Deterministic request generation
// ============================================================================

/// Generate a request with `count` claimants and capacity at `fill` of demand
fn generate_request(count: usize, seed: u64, fill: f64) -> AllocationRequest {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut total_cents: i64 = 0;

    let claimants = (0..count)
        .map(|i| {
            let cents: i64 = rng.gen_range(100..=10_000_000);
            total_cents += cents;
            Claimant::new(
                format!("claimant-{i}"),
                Decimal::new(cents, 2),
                Decimal::from(rng.gen_range(1..=1_000i64)),
            )
        })
        .collect();

    AllocationRequest::new(Decimal::new((total_cents as f64 * fill) as i64, 2), claimants)
}

/// Request where every pass caps exactly one claimant
fn cascading_request(count: usize) -> AllocationRequest {
    let claimants = (0..count)
        .map(|i| {
            Claimant::new(
                format!("claimant-{i}"),
                Decimal::from(i as i64 + 1),
                Decimal::from((count - i) as i64 * 1_000),
            )
        })
        .collect();

    AllocationRequest::new(Decimal::from(count as i64 * 2), claimants)
}

// ============================================================================
// BENCHMARK: Scaling
// ============================================================================

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");
    group.measurement_time(Duration::from_secs(10));

    let engine = AllocationEngine::new(EngineConfig::without_trace());

    for count in [10, 100, 1_000] {
        let request = generate_request(count, 42, 0.5);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("claimants", count), &request, |b, request| {
            b.iter(|| black_box(engine.allocate(request)))
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Worst-case pass count
// ============================================================================

fn bench_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade");
    group.sample_size(20);

    let engine = AllocationEngine::new(EngineConfig::without_trace());
    let request = cascading_request(200);

    group.bench_function("200_claimants", |b| {
        b.iter(|| black_box(engine.allocate(&request)))
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Trace overhead
// ============================================================================

fn bench_trace(c: &mut Criterion) {
    let mut group = c.benchmark_group("trace");

    let request = generate_request(500, 12345, 0.3);

    for (label, config) in [
        ("enabled", EngineConfig::default()),
        ("disabled", EngineConfig::without_trace()),
    ] {
        let engine = AllocationEngine::new(config);
        group.bench_function(label, |b| b.iter(|| black_box(engine.allocate(&request))));
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Receipt digest
// ============================================================================

fn bench_digest(c: &mut Criterion) {
    let request = generate_request(1_000, 7, 0.5);
    let allocations = AllocationEngine::new(EngineConfig::without_trace())
        .allocate(&request)
        .map(|outcome| outcome.allocations)
        .unwrap_or_default();

    c.bench_function("digest_1k", |b| {
        b.iter(|| black_box(AllocationReceipt::compute_digest(&allocations)))
    });
}

// ============================================================================
// CRITERION ENTRY POINT
// ============================================================================

criterion_group!(benches, bench_scaling, bench_cascade, bench_trace, bench_digest);

criterion_main!(benches);
