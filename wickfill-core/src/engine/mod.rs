//! Backtest engine — the single entry point tying strategy lookup, trade
//! simulation, and performance aggregation together.
//!
//! A run is a pure function of its inputs: the same series, strategy id,
//! parameters, and account settings always produce the same trade list and
//! report. Degenerate series (empty, or with out-of-order timestamps) yield
//! an empty run rather than an error; only an unknown strategy id fails.

pub mod execution;
pub mod report;

use thiserror::Error;

pub use execution::{BracketParams, CostModel, EntryProposal, TradeSimulator};
pub use report::PerformanceReport;

use crate::domain::{Candle, Trade};
use crate::strategy::{StrategyParams, StrategyRegistry};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
}

/// Run a backtest against the built-in strategy registry.
#[allow(clippy::too_many_arguments)]
pub fn backtest(
    strategy_id: &str,
    series: &[Candle],
    params: &StrategyParams,
    initial_capital: f64,
    fee_rate: f64,
    slippage_rate: f64,
) -> Result<(PerformanceReport, Vec<Trade>), EngineError> {
    backtest_with(
        &StrategyRegistry::with_builtins(),
        strategy_id,
        series,
        params,
        initial_capital,
        fee_rate,
        slippage_rate,
    )
}

/// Run a backtest against a caller-supplied registry.
#[allow(clippy::too_many_arguments)]
pub fn backtest_with(
    registry: &StrategyRegistry,
    strategy_id: &str,
    series: &[Candle],
    params: &StrategyParams,
    initial_capital: f64,
    fee_rate: f64,
    slippage_rate: f64,
) -> Result<(PerformanceReport, Vec<Trade>), EngineError> {
    let costs = CostModel::new(fee_rate, slippage_rate);
    let strategy = registry.build(strategy_id, series, params, costs, initial_capital)?;

    // The strategy id must resolve even when the series is unusable.
    if !series_is_ordered(series) {
        return Ok((PerformanceReport::empty(initial_capital), Vec::new()));
    }

    let trades = strategy.run();
    let report = PerformanceReport::compute(&trades, initial_capital);
    Ok((report, trades))
}

/// Strictly increasing timestamps; an empty series is not usable.
fn series_is_ordered(series: &[Candle]) -> bool {
    !series.is_empty() && series.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
}
