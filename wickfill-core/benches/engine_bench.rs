//! Criterion benchmarks for the wickfill hot paths.
//!
//! Benchmarks:
//! 1. Full backtest over a synthetic oscillating series
//! 2. Performance aggregation on the resulting trade list

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::{Duration, TimeZone, Utc};
use wickfill_core::backtest;
use wickfill_core::domain::Candle;
use wickfill_core::engine::PerformanceReport;
use wickfill_core::strategy::StrategyParams;

// ── Helpers ──────────────────────────────────────────────────────────

/// Oscillating series that stays range-bound with periodic wicky candles,
/// so the signal detector and simulator both get exercised.
fn make_series(n: usize) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let mid = 100.0 + (i as f64 * 0.3).sin() * 0.8;
            let open = mid - 0.2;
            let close = mid + 0.2;
            // Every 17th bar carries an exaggerated upper wick.
            let high = if i % 17 == 0 { close + 2.0 } else { close + 0.1 };
            let low = open - 0.1;
            Candle {
                timestamp: base + Duration::hours(i as i64),
                open,
                high,
                low,
                close,
                volume: 1_000.0,
            }
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtest");
    for size in [1_000, 10_000] {
        let series = make_series(size);
        group.bench_with_input(BenchmarkId::new("wick_fill", size), &series, |b, series| {
            b.iter(|| {
                backtest(
                    "wick_fill",
                    black_box(series),
                    &StrategyParams::new(),
                    10_000.0,
                    0.001,
                    0.001,
                )
            })
        });
    }
    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let series = make_series(10_000);
    let (_, trades) = backtest(
        "wick_fill",
        &series,
        &StrategyParams::new(),
        10_000.0,
        0.001,
        0.001,
    )
    .unwrap();

    c.bench_function("performance_report", |b| {
        b.iter(|| PerformanceReport::compute(black_box(&trades), 10_000.0))
    });
}

criterion_group!(benches, bench_backtest, bench_report);
criterion_main!(benches);
