//! Wick-fill mean-reversion strategy.
//!
//! The setup is a candle with a disproportionately long wick inside a
//! range-bound market: price probed away from the range and was rejected, so
//! we fade the probe and bet on the wick "filling" back toward the range.
//! An unusually long upper wick proposes a long, a long lower wick proposes a
//! short, and when one candle shows both the long wins.
//!
//! Signals fire only on completed candles; execution is handed to the
//! [`TradeSimulator`], which enters at the following bar's open.

use crate::domain::{Candle, Trade, TradeDirection};
use crate::engine::execution::{BracketParams, CostModel, EntryProposal, TradeSimulator};
use crate::strategy::{Strategy, StrategyParams};

/// Tuning knobs for [`WickFillStrategy`], resolved from a [`StrategyParams`]
/// bag with these defaults filling any gaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WickFillParams {
    /// Minimum wick-to-body ratio for a candle to count as a signal.
    pub wick_threshold: f64,
    /// Number of trailing candles inspected by the range-bound gate.
    pub range_window: usize,
    /// Gate passes when the window's overall span is below this multiple of
    /// its mean candle span.
    pub range_factor: f64,
    /// Target distance as a multiple of the entry-to-stop risk.
    pub risk_reward_ratio: f64,
    /// Stop placed this fraction beyond the signal candle's extreme.
    pub stop_buffer: f64,
    /// Bars a position may stay open before a forced close.
    pub max_holding_period: usize,
}

impl Default for WickFillParams {
    fn default() -> Self {
        Self {
            wick_threshold: 0.5,
            range_window: 20,
            range_factor: 3.0,
            risk_reward_ratio: 2.0,
            stop_buffer: 0.005,
            max_holding_period: 10,
        }
    }
}

impl WickFillParams {
    /// Resolve from a generic parameter bag, defaulting anything unset.
    pub fn from_params(params: &StrategyParams) -> Self {
        let d = Self::default();
        Self {
            wick_threshold: params.param("wick_threshold", d.wick_threshold),
            range_window: params.param_usize("range_window", d.range_window),
            range_factor: params.param("range_factor", d.range_factor),
            risk_reward_ratio: params.param("risk_reward_ratio", d.risk_reward_ratio),
            stop_buffer: params.param("stop_buffer", d.stop_buffer),
            max_holding_period: params.param_usize("max_holding_period", d.max_holding_period),
        }
    }

    fn bracket(&self) -> BracketParams {
        BracketParams {
            risk_reward_ratio: self.risk_reward_ratio,
            stop_buffer: self.stop_buffer,
            max_holding_period: self.max_holding_period,
        }
    }
}

/// Wick-fill strategy bound to a candle series.
#[derive(Debug)]
pub struct WickFillStrategy<'a> {
    series: &'a [Candle],
    params: WickFillParams,
    costs: CostModel,
    initial_capital: f64,
}

impl<'a> WickFillStrategy<'a> {
    pub fn new(
        series: &'a [Candle],
        params: WickFillParams,
        costs: CostModel,
        initial_capital: f64,
    ) -> Self {
        assert!(params.wick_threshold > 0.0, "wick_threshold must be positive");
        assert!(params.range_window > 0, "range_window must be positive");
        assert!(params.range_factor > 0.0, "range_factor must be positive");
        assert!(
            params.risk_reward_ratio > 0.0,
            "risk_reward_ratio must be positive"
        );
        assert!(params.stop_buffer >= 0.0, "stop_buffer must be non-negative");
        assert!(
            params.max_holding_period > 0,
            "max_holding_period must be positive"
        );
        Self {
            series,
            params,
            costs,
            initial_capital,
        }
    }

    /// From a generic parameter bag, as the registry constructs it.
    pub fn from_params(
        series: &'a [Candle],
        params: &StrategyParams,
        costs: CostModel,
        initial_capital: f64,
    ) -> Self {
        Self::new(
            series,
            WickFillParams::from_params(params),
            costs,
            initial_capital,
        )
    }

    /// True when the trailing `range_window` candles before `idx` form a
    /// tight range: overall span below `range_factor` times the mean span.
    ///
    /// Always false until a full window of history exists.
    pub fn is_range_bound(&self, idx: usize) -> bool {
        if idx < self.params.range_window {
            return false;
        }
        let window = &self.series[idx - self.params.range_window..idx];
        let mut highest = f64::MIN;
        let mut lowest = f64::MAX;
        let mut span_sum = 0.0;
        for candle in window {
            highest = highest.max(candle.high);
            lowest = lowest.min(candle.low);
            span_sum += candle.span();
        }
        let overall = highest - lowest;
        let mean_span = span_sum / window.len() as f64;
        overall < self.params.range_factor * mean_span
    }

    /// Evaluate the candle at `idx` for a wick-fill signal.
    ///
    /// Zero-body candles never signal (the wick ratio is relative to the
    /// body), and no signal fires outside a range-bound market. A long upper
    /// wick means sellers rejected the probe higher, so the signal fades it
    /// with a long on the expected fill; the lower-wick short is symmetric.
    pub fn signal_at(&self, idx: usize) -> Option<TradeDirection> {
        let candle = &self.series[idx];
        let body = candle.body();
        if body == 0.0 {
            return None;
        }
        if !self.is_range_bound(idx) {
            return None;
        }
        if candle.upper_wick() / body >= self.params.wick_threshold {
            return Some(TradeDirection::Long);
        }
        if candle.lower_wick() / body >= self.params.wick_threshold {
            return Some(TradeDirection::Short);
        }
        None
    }
}

impl Strategy for WickFillStrategy<'_> {
    fn name(&self) -> &str {
        "wick_fill"
    }

    /// Scan the series with a single forward cursor. After a trade closes,
    /// the cursor resumes one bar past the exit so trades never overlap; a
    /// signal bar that cannot open a trade just advances the cursor.
    fn run(&self) -> Vec<Trade> {
        let mut sim = TradeSimulator::new(
            self.series,
            self.params.bracket(),
            self.costs,
            self.initial_capital,
        );
        let mut trades = Vec::new();

        let mut i = self.params.range_window;
        while i + 1 < self.series.len() {
            if let Some(direction) = self.signal_at(i) {
                if let Some((trade, exit_idx)) =
                    sim.simulate(&EntryProposal { index: i, direction })
                {
                    trades.push(trade);
                    i = exit_idx + 1;
                    continue;
                }
            }
            i += 1;
        }
        trades
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candle(i: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
                + Duration::hours(i as i64),
            open,
            high,
            low,
            close,
            volume: 500.0,
        }
    }

    /// Candle with a decent body and negligible wicks, oscillating inside
    /// [99, 101] so a 20-bar window stays range-bound.
    fn quiet_candle(i: usize) -> Candle {
        if i % 2 == 0 {
            candle(i, 99.2, 100.85, 99.15, 100.8)
        } else {
            candle(i, 100.8, 100.85, 99.15, 99.2)
        }
    }

    fn quiet_series(len: usize) -> Vec<Candle> {
        (0..len).map(quiet_candle).collect()
    }

    fn strategy(series: &[Candle]) -> WickFillStrategy<'_> {
        WickFillStrategy::new(
            series,
            WickFillParams::default(),
            CostModel::frictionless(),
            10_000.0,
        )
    }

    #[test]
    fn default_params_match_settings() {
        let p = WickFillParams::default();
        assert_eq!(p.wick_threshold, 0.5);
        assert_eq!(p.range_window, 20);
        assert_eq!(p.range_factor, 3.0);
        assert_eq!(p.risk_reward_ratio, 2.0);
        assert_eq!(p.stop_buffer, 0.005);
        assert_eq!(p.max_holding_period, 10);
    }

    #[test]
    fn params_resolve_overrides_and_defaults() {
        let bag = StrategyParams::new()
            .set("wick_threshold", 0.8)
            .set("range_window", 30.0);
        let p = WickFillParams::from_params(&bag);
        assert_eq!(p.wick_threshold, 0.8);
        assert_eq!(p.range_window, 30);
        assert_eq!(p.range_factor, 3.0);
        assert_eq!(p.max_holding_period, 10);
    }

    #[test]
    fn not_range_bound_without_full_window() {
        let series = quiet_series(10);
        let strat = strategy(&series);
        assert!(!strat.is_range_bound(5));
        assert!(!strat.is_range_bound(9));
    }

    #[test]
    fn range_gate_passes_on_quiet_series() {
        let series = quiet_series(25);
        let strat = strategy(&series);
        assert!(strat.is_range_bound(20));
    }

    #[test]
    fn range_gate_blocks_trending_series() {
        // Each bar steps up a full bar-height: overall span ~= window * span.
        let series: Vec<Candle> = (0..25)
            .map(|i| {
                let base = 100.0 + 2.0 * i as f64;
                candle(i, base, base + 2.0, base, base + 1.9)
            })
            .collect();
        let strat = strategy(&series);
        assert!(!strat.is_range_bound(20));
        assert_eq!(strat.signal_at(20), None);
    }

    #[test]
    fn zero_body_candle_never_signals() {
        let mut series = quiet_series(25);
        // Huge wicks, no body.
        series[20] = candle(20, 100.0, 103.0, 97.0, 100.0);
        let strat = strategy(&series);
        assert_eq!(strat.signal_at(20), None);
    }

    #[test]
    fn upper_wick_signals_long() {
        let mut series = quiet_series(25);
        series[20] = candle(20, 100.0, 103.0, 99.8, 100.5);
        let strat = strategy(&series);
        assert_eq!(strat.signal_at(20), Some(TradeDirection::Long));
    }

    #[test]
    fn lower_wick_signals_short() {
        let mut series = quiet_series(25);
        series[20] = candle(20, 100.5, 100.6, 97.5, 100.0);
        let strat = strategy(&series);
        assert_eq!(strat.signal_at(20), Some(TradeDirection::Short));
    }

    #[test]
    fn long_wins_when_both_wicks_qualify() {
        let mut series = quiet_series(25);
        // Tiny body centered between two long wicks.
        series[20] = candle(20, 100.0, 101.5, 98.5, 100.1);
        let strat = strategy(&series);
        assert_eq!(strat.signal_at(20), Some(TradeDirection::Long));
    }

    #[test]
    fn sub_threshold_wicks_do_not_signal() {
        let series = quiet_series(25);
        let strat = strategy(&series);
        // Quiet candles have wick/body ratios far below 0.5.
        assert_eq!(strat.signal_at(20), None);
        assert_eq!(strat.signal_at(22), None);
    }

    #[test]
    fn run_produces_single_stopped_long() {
        let mut series = quiet_series(30);
        // Signal bar: long upper wick inside the range.
        series[20] = candle(20, 100.0, 103.0, 99.8, 100.5);
        // Entry bar: opens at 100.2, touches neither bracket level.
        series[21] = candle(21, 100.2, 100.6, 100.0, 100.3);
        // Stop bar: low pierces 99.8 * 0.995 = 99.301.
        series[22] = candle(22, 100.0, 100.3, 99.0, 99.1);

        let strat = strategy(&series);
        let trades = strat.run();

        assert_eq!(trades.len(), 1);
        let trade = &trades[0];
        assert_eq!(trade.trade_type, TradeDirection::Long);
        assert_eq!(trade.entry_time, series[21].timestamp);
        assert_eq!(trade.entry_price, 100.2);
        assert_eq!(trade.exit_time, series[22].timestamp);
        assert!((trade.exit_price - 99.8 * 0.995).abs() < 1e-12);
        assert_eq!(trade.exit_price, trade.stop_loss);
        assert!(trade.realized_pnl < 0.0);
    }

    #[test]
    fn cursor_skips_bars_inside_open_trade() {
        let mut series = quiet_series(40);
        // First signal at 20, stopped at 22.
        series[20] = candle(20, 100.0, 103.0, 99.8, 100.5);
        series[21] = candle(21, 100.2, 100.6, 100.0, 100.3);
        series[22] = candle(22, 100.0, 100.3, 99.0, 99.1);
        // A would-be signal at 21 must never fire: the cursor is inside the
        // first trade until bar 23.
        series[23] = candle(23, 99.5, 102.5, 99.4, 99.9);
        series[24] = candle(24, 99.9, 100.3, 99.6, 100.1);
        series[25] = candle(25, 100.1, 100.4, 98.9, 99.0);

        let strat = strategy(&series);
        let trades = strat.run();

        assert_eq!(trades.len(), 2);
        assert!(trades[0].exit_time < trades[1].entry_time);
        assert_eq!(trades[1].entry_time, series[24].timestamp);
    }

    #[test]
    fn signal_on_final_candle_is_ignored() {
        let mut series = quiet_series(22);
        series[21] = candle(21, 100.0, 103.0, 99.8, 100.5);
        let strat = strategy(&series);
        assert!(strat.run().is_empty());
    }

    #[test]
    fn no_signals_yields_no_trades() {
        let series = quiet_series(60);
        let strat = strategy(&series);
        assert!(strat.run().is_empty());
    }
}
