//! Trade — a completed round-trip position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a simulated position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Long,
    Short,
}

/// A closed trade, created atomically by the trade simulator when an exit
/// condition fires and never mutated afterward.
///
/// `entry_price` and `exit_price` are the raw fill levels: `exit_price` is
/// always exactly one of the stop-loss, the take-profit, or the close of the
/// last held bar. Cost adjustments are carried separately in `fees_paid` and
/// `slippage_cost`; `realized_pnl` is computed on the cost-adjusted prices.
///
/// Invariants:
/// - for long trades, `stop_loss < entry_price < take_profit`;
/// - for short trades, `take_profit < entry_price < stop_loss`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_type: TradeDirection,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub fees_paid: f64,
    pub slippage_cost: f64,
    pub realized_pnl: f64,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.realized_pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trade() -> Trade {
        Trade {
            trade_type: TradeDirection::Long,
            entry_time: Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap(),
            entry_price: 100.0,
            exit_time: Utc.with_ymd_and_hms(2024, 1, 2, 14, 0, 0).unwrap(),
            exit_price: 104.0,
            stop_loss: 98.0,
            take_profit: 104.0,
            fees_paid: 0.2,
            slippage_cost: 0.1,
            realized_pnl: 3.7,
        }
    }

    #[test]
    fn is_winner() {
        assert!(sample_trade().is_winner());
        let mut loser = sample_trade();
        loser.realized_pnl = -1.0;
        assert!(!loser.is_winner());
        loser.realized_pnl = 0.0;
        assert!(!loser.is_winner());
    }

    #[test]
    fn direction_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TradeDirection::Long).unwrap(),
            "\"long\""
        );
        assert_eq!(
            serde_json::to_string(&TradeDirection::Short).unwrap(),
            "\"short\""
        );
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
