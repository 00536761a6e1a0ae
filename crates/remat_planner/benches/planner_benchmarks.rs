//! Benchmarks for remat_planner.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use remat_core::stage::{StageGroup, StageOp};
use remat_core::Chain;
use remat_planner::prelude::*;

/// Generate a uniform pipeline for benchmarking.
fn generate_pipeline(layers: usize) -> Vec<StageGroup<f64>> {
    (0..layers)
        .map(|i| {
            StageGroup::new(vec![
                StageOp::new(format!("layer{}_matmul", i), 400.0, 800.0, 64 * 1024)
                    .with_grad_bytes(64 * 1024),
                StageOp::new(format!("layer{}_act", i), 50.0, 50.0, 64 * 1024)
                    .with_grad_bytes(64 * 1024)
                    .with_inputs(vec![0]),
            ])
            .with_consumer_grad_bytes(vec![64 * 1024])
        })
        .collect()
}

/// A bare chain for the table-fill benchmarks, bypassing construction.
fn generate_chain(len: usize) -> Chain<f64> {
    Chain::new(
        (0..len).map(|i| 400.0 + (i % 7) as f64 * 10.0).collect(),
        (0..len).map(|i| 800.0 + (i % 5) as f64 * 20.0).collect(),
        (0..=len).map(|i| 2 + i % 3).collect(),
        (0..=len).map(|i| 3 + i % 3).collect(),
        vec![0; len],
        (0..len).map(|i| i % 2).collect(),
    )
    .unwrap()
}

fn benchmark_table_fill_by_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_fill_by_length");

    for len in [8, 16, 32, 64] {
        let chain = generate_chain(len);

        group.bench_with_input(BenchmarkId::from_parameter(len), &chain, |b, chain| {
            b.iter(|| compute_tables(black_box(chain), 100))
        });
    }

    group.finish();
}

fn benchmark_table_fill_by_slots(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_fill_by_slots");

    let chain = generate_chain(16);
    for slots in [50, 100, 250, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(slots), &slots, |b, &slots| {
            b.iter(|| compute_tables(black_box(&chain), slots))
        });
    }

    group.finish();
}

fn benchmark_reconstruct(c: &mut Criterion) {
    let chain = generate_chain(32);
    let tables = compute_tables(&chain, 100);

    c.bench_function("reconstruct_32_stages", |b| {
        b.iter(|| reconstruct(black_box(&chain), 0, chain.length(), 98, &tables))
    });
}

fn benchmark_plan_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_end_to_end");

    for layers in [8, 16, 32] {
        let stages = generate_pipeline(layers);
        let config = PlannerConfig::new(2 * 1024 * 1024).with_mem_slots(100);

        group.bench_with_input(
            BenchmarkId::from_parameter(layers),
            &stages,
            |b, stages| b.iter(|| plan(black_box(stages), &[64 * 1024], &config)),
        );
    }

    group.finish();
}

fn benchmark_chain_build(c: &mut Criterion) {
    let stages = generate_pipeline(64);

    c.bench_function("chain_build_64_stages", |b| {
        b.iter(|| build_chain::<f64>(black_box(&stages), &[64 * 1024], 1024))
    });
}

criterion_group!(
    benches,
    benchmark_table_fill_by_length,
    benchmark_table_fill_by_slots,
    benchmark_reconstruct,
    benchmark_plan_end_to_end,
    benchmark_chain_build,
);
criterion_main!(benches);
