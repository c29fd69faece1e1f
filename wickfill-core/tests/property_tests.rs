//! Property tests for backtest invariants.
//!
//! Uses proptest to verify, over arbitrary sane candle series:
//! 1. Bracket orientation — long stops below entry, shorts above
//! 2. Exit discipline — every exit price is the stop, the target, or the
//!    exit bar's close
//! 3. Non-overlap — the next trade always enters after the previous exit
//! 4. Determinism — identical inputs reproduce identical trades
//! 5. Accounting — the report is consistent with the trade list

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use wickfill_core::backtest;
use wickfill_core::domain::{Candle, TradeDirection};
use wickfill_core::strategy::StrategyParams;

// ── Strategies (proptest) ────────────────────────────────────────────

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Random-walk candle series with strictly increasing hourly timestamps,
/// positive prices, and sane high/low bounds.
fn arb_candle_series() -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec(
        (any::<bool>(), 0.0..2.0_f64, 0.0..2.0_f64, 0.0..2.0_f64),
        25..120,
    )
    .prop_map(|raws| {
        let mut price = 100.0_f64;
        raws.into_iter()
            .enumerate()
            .map(|(i, (up, body, upper, lower))| {
                let open = price;
                let close = if up { open + body } else { (open - body).max(1.0) };
                let high = open.max(close) + upper;
                let low = (open.min(close) - lower).max(0.5);
                price = close;
                Candle {
                    timestamp: base_time() + Duration::hours(i as i64),
                    open,
                    high,
                    low,
                    close,
                    volume: 1_000.0,
                }
            })
            .collect()
    })
}

fn run(series: &[Candle]) -> Vec<wickfill_core::domain::Trade> {
    let (_, trades) = backtest(
        "wick_fill",
        series,
        &StrategyParams::new(),
        10_000.0,
        0.0,
        0.0,
    )
    .unwrap();
    trades
}

// ── Invariants ───────────────────────────────────────────────────────

proptest! {
    /// Long brackets sit stop < entry < target; shorts are mirrored.
    #[test]
    fn bracket_orientation_holds(series in arb_candle_series()) {
        for trade in run(&series) {
            match trade.trade_type {
                TradeDirection::Long => {
                    prop_assert!(trade.stop_loss < trade.entry_price);
                    prop_assert!(trade.entry_price < trade.take_profit);
                }
                TradeDirection::Short => {
                    prop_assert!(trade.take_profit < trade.entry_price);
                    prop_assert!(trade.entry_price < trade.stop_loss);
                }
            }
        }
    }

    /// Every exit is one of the three exit rules: stop, target, or the
    /// closing price of the bar the trade exited on.
    #[test]
    fn exit_price_comes_from_an_exit_rule(series in arb_candle_series()) {
        for trade in run(&series) {
            let exit_bar = series
                .iter()
                .find(|c| c.timestamp == trade.exit_time)
                .expect("exit_time must point at a series bar");
            prop_assert!(
                trade.exit_price == trade.stop_loss
                    || trade.exit_price == trade.take_profit
                    || trade.exit_price == exit_bar.close
            );
        }
    }

    /// Entry follows the signal, exit follows the entry, and no trade opens
    /// before the previous one has closed.
    #[test]
    fn trades_are_ordered_and_never_overlap(series in arb_candle_series()) {
        let trades = run(&series);
        for trade in &trades {
            prop_assert!(trade.entry_time <= trade.exit_time);
        }
        for pair in trades.windows(2) {
            prop_assert!(pair[0].exit_time < pair[1].entry_time);
        }
    }

    /// Identical inputs always reproduce the identical trade list.
    #[test]
    fn replay_is_deterministic(series in arb_candle_series()) {
        prop_assert_eq!(run(&series), run(&series));
    }

    /// Final capital equals starting capital plus the summed realized P&L,
    /// and the trade count matches.
    #[test]
    fn report_accounting_is_consistent(series in arb_candle_series()) {
        let (report, trades) = backtest(
            "wick_fill",
            &series,
            &StrategyParams::new(),
            10_000.0,
            0.001,
            0.001,
        )
        .unwrap();
        let net: f64 = trades.iter().map(|t| t.realized_pnl).sum();
        prop_assert_eq!(report.total_trades, trades.len());
        prop_assert!((report.total_net_profit - net).abs() < 1e-6);
        prop_assert!((report.final_capital - (10_000.0 + net)).abs() < 1e-6);
        prop_assert!(report.max_drawdown >= 0.0);
        prop_assert!((0.0..=1.0).contains(&report.win_rate));
    }
}
