//! Trade simulation — turns a directional entry proposal into a closed trade.
//!
//! Entry is always at the next bar's open (the decision is made on the signal
//! bar's completed data, execution happens one bar later — no look-ahead).
//! The exit scan applies the stop-loss, take-profit, and time-based exit
//! rules bar by bar, with the stop checked before the target when both
//! trigger on the same bar: assume the worse outcome happened first intrabar.

use crate::domain::{Candle, Trade, TradeDirection};
use serde::{Deserialize, Serialize};

/// Proportional transaction costs applied to every fill.
///
/// `fee_rate` is a commission charged on notional at both entry and exit.
/// `slippage_rate` degrades both fill prices in the direction unfavorable to
/// the position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub fee_rate: f64,
    pub slippage_rate: f64,
}

impl CostModel {
    pub fn new(fee_rate: f64, slippage_rate: f64) -> Self {
        Self {
            fee_rate,
            slippage_rate,
        }
    }

    /// Zero fees, zero slippage.
    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Default for CostModel {
    /// 10 bps fee and 10 bps slippage per fill.
    fn default() -> Self {
        Self::new(0.001, 0.001)
    }
}

/// A directional entry proposal emitted by a signal detector at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryProposal {
    pub index: usize,
    pub direction: TradeDirection,
}

/// Stop/target/time-exit parameters for the forward exit scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketParams {
    pub risk_reward_ratio: f64,
    pub stop_buffer: f64,
    pub max_holding_period: usize,
}

/// Walks entry proposals forward through the series, producing closed trades
/// and compounding running capital trade-by-trade.
///
/// The simulator owns the non-overlap guarantee: `simulate` reports the exit
/// bar index, and the caller must resume its scan at `exit_index + 1` so no
/// proposal is evaluated inside an open trade's lifetime.
pub struct TradeSimulator<'a> {
    series: &'a [Candle],
    bracket: BracketParams,
    costs: CostModel,
    capital: f64,
}

impl<'a> TradeSimulator<'a> {
    pub fn new(
        series: &'a [Candle],
        bracket: BracketParams,
        costs: CostModel,
        initial_capital: f64,
    ) -> Self {
        Self {
            series,
            bracket,
            costs,
            capital: initial_capital,
        }
    }

    /// Running capital after all trades simulated so far.
    pub fn capital(&self) -> f64 {
        self.capital
    }

    /// Simulate one proposal. Returns the closed trade and the index of its
    /// exit bar, or `None` when no trade can be opened (no next bar, entry
    /// gapping through the stop, or exhausted capital).
    pub fn simulate(&mut self, proposal: &EntryProposal) -> Option<(Trade, usize)> {
        let i = proposal.index;
        let entry_idx = i + 1;
        if entry_idx >= self.series.len() || self.capital <= 0.0 {
            return None;
        }

        let signal = &self.series[i];
        let entry_price = self.series[entry_idx].open;

        let (stop_loss, take_profit) = match proposal.direction {
            TradeDirection::Long => {
                let stop = signal.low * (1.0 - self.bracket.stop_buffer);
                let risk = entry_price - stop;
                if risk <= 0.0 {
                    return None; // entry gapped through the stop
                }
                (stop, entry_price + self.bracket.risk_reward_ratio * risk)
            }
            TradeDirection::Short => {
                let stop = signal.high * (1.0 + self.bracket.stop_buffer);
                let risk = stop - entry_price;
                if risk <= 0.0 {
                    return None;
                }
                (stop, entry_price - self.bracket.risk_reward_ratio * risk)
            }
        };

        let (exit_idx, exit_price) =
            self.scan_exit(entry_idx, proposal.direction, stop_loss, take_profit);

        let trade = self.fill(
            proposal.direction,
            entry_idx,
            entry_price,
            exit_idx,
            exit_price,
            stop_loss,
            take_profit,
        );
        Some((trade, exit_idx))
    }

    /// Forward scan over `[entry_idx, entry_idx + max_holding_period)`,
    /// clipped to series bounds. Stop first, then target; if neither triggers
    /// the position closes at the last held bar's close.
    fn scan_exit(
        &self,
        entry_idx: usize,
        direction: TradeDirection,
        stop_loss: f64,
        take_profit: f64,
    ) -> (usize, f64) {
        let window_end = (entry_idx + self.bracket.max_holding_period).min(self.series.len());

        for j in entry_idx..window_end {
            let candle = &self.series[j];
            match direction {
                TradeDirection::Long => {
                    if candle.low <= stop_loss {
                        return (j, stop_loss);
                    }
                    if candle.high >= take_profit {
                        return (j, take_profit);
                    }
                }
                TradeDirection::Short => {
                    if candle.high >= stop_loss {
                        return (j, stop_loss);
                    }
                    if candle.low <= take_profit {
                        return (j, take_profit);
                    }
                }
            }
        }

        // Time-based exit at the close of the last bar in the window.
        let last = window_end - 1;
        (last, self.series[last].close)
    }

    /// Apply the cost model, compute realized P&L on the adjusted prices,
    /// compound capital, and emit the immutable trade record.
    #[allow(clippy::too_many_arguments)]
    fn fill(
        &mut self,
        direction: TradeDirection,
        entry_idx: usize,
        entry_price: f64,
        exit_idx: usize,
        exit_price: f64,
        stop_loss: f64,
        take_profit: f64,
    ) -> Trade {
        let slip = self.costs.slippage_rate;
        let (entry_fill, exit_fill) = match direction {
            TradeDirection::Long => (entry_price * (1.0 + slip), exit_price * (1.0 - slip)),
            TradeDirection::Short => (entry_price * (1.0 - slip), exit_price * (1.0 + slip)),
        };

        // Full running capital as notional; the next trade sizes off the
        // compounded balance, not the original starting capital.
        let quantity = self.capital / entry_fill;
        let fees_paid = (entry_fill + exit_fill) * quantity * self.costs.fee_rate;
        let slippage_cost =
            ((entry_fill - entry_price).abs() + (exit_price - exit_fill).abs()) * quantity;
        let gross = match direction {
            TradeDirection::Long => (exit_fill - entry_fill) * quantity,
            TradeDirection::Short => (entry_fill - exit_fill) * quantity,
        };
        let realized_pnl = gross - fees_paid;
        self.capital += realized_pnl;

        Trade {
            trade_type: direction,
            entry_time: self.series[entry_idx].timestamp,
            entry_price,
            exit_time: self.series[exit_idx].timestamp,
            exit_price,
            stop_loss,
            take_profit,
            fees_paid,
            slippage_cost,
            realized_pnl,
        }
    }
}
