//! Benchmarks for filter estimation over wide predicates.

use std::hint::black_box;

use cardo_common::types::DataType;
use cardo_core::statistics::{ColumnStatistic, Statistics};
use cardo_engine::{Expression, FilterEstimator};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// A snapshot with `width` integer columns `c0..c{width}`.
fn wide_stats(width: usize) -> Statistics {
    let mut builder = Statistics::builder(1_000_000.0);
    for i in 0..width {
        builder = builder.with_column(
            format!("c{i}"),
            ColumnStatistic::builder(1_000_000.0)
                .with_ndv(10_000.0)
                .with_nulls(1_000.0)
                .with_range(0.0, 100_000.0)
                .build(),
        );
    }
    builder.build()
}

fn column(i: usize) -> Expression {
    Expression::column(format!("c{i}"), DataType::BigInt)
}

/// `c0 BETWEEN .. AND c1 BETWEEN .. AND ...`: two range conjuncts per column.
fn conjunction(width: usize) -> Expression {
    Expression::and((0..width).map(|i| {
        let low = (i as i64) * 100;
        column(i).between(Expression::literal(low), Expression::literal(low + 50_000))
    }))
}

/// `(c0 = 1 AND c1 > 10) OR (c1 = 2 AND c2 > 20) OR ...`
fn disjunction(width: usize) -> Expression {
    Expression::or((0..width).map(|i| {
        let next = (i + 1) % width;
        Expression::and([
            column(i).eq(Expression::literal(i as i64)),
            column(next).gt(Expression::literal((i as i64) * 10)),
        ])
    }))
}

fn bench_conjunction(c: &mut Criterion) {
    let mut group = c.benchmark_group("conjunction");
    let estimator = FilterEstimator::new();

    for width in [4, 16, 64] {
        let stats = wide_stats(width);
        let predicate = conjunction(width);
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &predicate, |b, p| {
            b.iter(|| estimator.estimate(black_box(p), black_box(&stats)));
        });
    }
    group.finish();
}

fn bench_disjunction(c: &mut Criterion) {
    let mut group = c.benchmark_group("disjunction");
    let estimator = FilterEstimator::new();

    for width in [4, 16, 64] {
        let stats = wide_stats(width);
        let predicate = disjunction(width);
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &predicate, |b, p| {
            b.iter(|| estimator.estimate(black_box(p), black_box(&stats)));
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let estimator = FilterEstimator::new();
    let stats = wide_stats(16);
    let candidates: Vec<Expression> = (1..=64).map(|i| conjunction(i % 16 + 1)).collect();

    c.bench_function("batch_64_candidates", |b| {
        b.iter(|| estimator.estimate_batch(black_box(&candidates), black_box(&stats)));
    });
}

criterion_group!(benches, bench_conjunction, bench_disjunction, bench_batch);
criterion_main!(benches);
