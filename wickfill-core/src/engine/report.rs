//! Performance aggregation — pure functions from a trade list to summary
//! risk/return metrics.
//!
//! Every metric is a pure function: trade list and starting capital in,
//! scalar out. Nothing here touches the engine, the series, or any I/O, and
//! a report is recomputed from scratch on every call — never persisted.

use serde::{Deserialize, Serialize};

use crate::domain::Trade;

/// Aggregate performance metrics for a single backtest run.
///
/// Field names are part of the output contract: external consumers render
/// them without renaming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub total_trades: usize,
    pub win_rate: f64,
    pub total_net_profit: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub final_capital: f64,
}

impl PerformanceReport {
    /// Compute all metrics from a trade list and starting capital.
    ///
    /// Trades are stepped in chronological exit-time order regardless of the
    /// order they arrive in.
    pub fn compute(trades: &[Trade], initial_capital: f64) -> Self {
        if trades.is_empty() {
            return Self::empty(initial_capital);
        }

        let mut ordered: Vec<&Trade> = trades.iter().collect();
        ordered.sort_by_key(|t| t.exit_time);

        let total_net_profit: f64 = ordered.iter().map(|t| t.realized_pnl).sum();
        let equity = equity_curve(&ordered, initial_capital);
        let returns = per_trade_returns(&ordered, initial_capital);

        Self {
            total_trades: ordered.len(),
            win_rate: win_rate(&ordered),
            total_net_profit,
            max_drawdown: max_drawdown(&equity),
            sharpe_ratio: sharpe_ratio(&returns),
            final_capital: initial_capital + total_net_profit,
        }
    }

    /// Zeroed report for a run that produced no trades.
    pub fn empty(initial_capital: f64) -> Self {
        Self {
            total_trades: 0,
            win_rate: 0.0,
            total_net_profit: 0.0,
            max_drawdown: 0.0,
            sharpe_ratio: 0.0,
            final_capital: initial_capital,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Fraction of trades with positive realized P&L; 0 for an empty list.
fn win_rate(trades: &[&Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Running capital starting at `initial_capital`, stepped by each trade.
fn equity_curve(trades: &[&Trade], initial_capital: f64) -> Vec<f64> {
    let mut equity = Vec::with_capacity(trades.len() + 1);
    equity.push(initial_capital);
    let mut capital = initial_capital;
    for trade in trades {
        capital += trade.realized_pnl;
        equity.push(capital);
    }
    equity
}

/// Maximum peak-to-trough decline as a positive fraction of the peak.
///
/// Returns 0.0 if capital never dips below a prior peak.
fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (peak - eq) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Per-trade returns: each trade's P&L as a fraction of the capital held
/// going into it.
fn per_trade_returns(trades: &[&Trade], initial_capital: f64) -> Vec<f64> {
    let mut returns = Vec::with_capacity(trades.len());
    let mut capital = initial_capital;
    for trade in trades {
        if capital > 0.0 {
            returns.push(trade.realized_pnl / capital);
        } else {
            returns.push(0.0);
        }
        capital += trade.realized_pnl;
    }
    returns
}

/// Mean over standard deviation of the per-trade return series.
///
/// Returns 0.0 with fewer than two trades or zero variance.
fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(returns);
    let std = std_dev(returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean / std
}

// ─── Helpers ────────────────────────────────────────────────────────

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 denominator).
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
