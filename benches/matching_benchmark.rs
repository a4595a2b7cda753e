// ============================================================================
// Matching Engine Benchmarks
// ============================================================================
//
// Benchmark Categories:
// 1. Book Walk - Incoming request against a deep book, book only
// 2. Fallback - Remainder routed to an in-memory liquidity source
// 3. Thresholds - Protective execution short-circuit
// 4. Order Book Operations - Snapshot and resting inserts
// ============================================================================

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use fallback_matching::prelude::*;
use fallback_matching::testing::MockLiquiditySource;
use rust_decimal::Decimal;
use std::hint::black_box;
use std::sync::Arc;

fn book_only_engine() -> MatchingEngine {
    MatchingEngineBuilder::new("BTC").book_only().build().unwrap()
}

fn engine_with_pool(price: i64) -> MatchingEngine {
    MatchingEngineBuilder::new("BTC")
        .with_liquidity(Arc::new(MockLiquiditySource::new(Decimal::from(price))))
        .build()
        .unwrap()
}

fn populate_asks(engine: &MatchingEngine, levels: i64, per_level: i64) {
    for i in 0..levels {
        for _ in 0..per_level {
            let sell = Request::limit("BTC", Side::Sell, Decimal::from(50000 + i), Decimal::ONE);
            engine.process(sell).unwrap();
        }
    }
}

// ============================================================================
// Book Walk Benchmarks
// ============================================================================

fn benchmark_book_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("book_walk");

    for levels in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(levels), levels, |b, &levels| {
            b.iter_batched(
                || {
                    let engine = book_only_engine();
                    populate_asks(&engine, levels, 1);
                    engine
                },
                |engine| {
                    // Sweeps the first five levels
                    let buy =
                        Request::limit("BTC", Side::Buy, Decimal::from(50005), Decimal::from(5));
                    black_box(engine.process(buy).unwrap());
                    engine
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn benchmark_steady_state_cross(c: &mut Criterion) {
    c.bench_function("steady_state_cross", |b| {
        let engine = book_only_engine();
        populate_asks(&engine, 100, 4);

        b.iter(|| {
            // Replenish and take the best level so the book depth stays flat
            engine
                .process(Request::limit("BTC", Side::Sell, Decimal::from(50000), Decimal::ONE))
                .unwrap();
            black_box(
                engine
                    .process(Request::market("BTC", Side::Buy, Decimal::ONE))
                    .unwrap(),
            );
        });
    });
}

fn benchmark_no_cross(c: &mut Criterion) {
    c.bench_function("limit_no_cross_then_cancel", |b| {
        let engine = book_only_engine();
        populate_asks(&engine, 1000, 1);

        b.iter(|| {
            let buy = Request::limit("BTC", Side::Buy, Decimal::from(40000), Decimal::ONE);
            let outcome = engine.process(buy).unwrap();
            black_box(engine.cancel(&outcome.request_id));
        });
    });
}

// ============================================================================
// Fallback Benchmarks
// ============================================================================

fn benchmark_fallback_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fallback");

    group.bench_function("empty_book", |b| {
        let engine = engine_with_pool(50000);
        b.iter(|| {
            black_box(
                engine
                    .process(Request::market("BTC", Side::Buy, Decimal::from(3)))
                    .unwrap(),
            );
        });
    });

    group.bench_function("book_then_fallback", |b| {
        let pool = Arc::new(MockLiquiditySource::new(Decimal::from(50000)));
        let engine = MatchingEngineBuilder::new("BTC")
            .with_liquidity(pool.clone())
            .build()
            .unwrap();
        b.iter(|| {
            // Rest a sell while the pool is closed, then cross it
            pool.set_available(Decimal::ZERO);
            engine
                .process(Request::limit("BTC", Side::Sell, Decimal::from(50000), Decimal::from(2)))
                .unwrap();
            pool.set_available(Decimal::from(1000));
            black_box(
                engine
                    .process(Request::market("BTC", Side::Buy, Decimal::from(5)))
                    .unwrap(),
            );
        });
    });

    group.finish();
}

fn benchmark_threshold_execution(c: &mut Criterion) {
    c.bench_function("threshold_execution", |b| {
        let engine = engine_with_pool(94);
        b.iter(|| {
            let request = Request::market("BTC", Side::Buy, Decimal::ONE)
                .with_stop_loss(Decimal::from(95));
            black_box(engine.process(request).unwrap());
        });
    });
}

// ============================================================================
// Order Book Operations Benchmarks
// ============================================================================

fn benchmark_order_book_snapshot(c: &mut Criterion) {
    c.bench_function("order_book_snapshot", |b| {
        let engine = book_only_engine();

        // 100 levels on each side
        for i in 0..100 {
            let bid = Decimal::from(49900 - i * 10);
            let ask = Decimal::from(50100 + i * 10);
            engine.process(Request::limit("BTC", Side::Buy, bid, Decimal::ONE)).unwrap();
            engine.process(Request::limit("BTC", Side::Sell, ask, Decimal::ONE)).unwrap();
        }

        b.iter(|| {
            black_box(engine.snapshot(10));
        });
    });
}

criterion_group!(
    benches,
    benchmark_book_walk,
    benchmark_steady_state_cross,
    benchmark_no_cross,
    benchmark_fallback_fill,
    benchmark_threshold_execution,
    benchmark_order_book_snapshot,
);
criterion_main!(benches);
