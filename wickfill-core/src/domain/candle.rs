//! Candle — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single symbol over a fixed time interval.
///
/// Candles are immutable once constructed. A series is expected to be
/// strictly increasing in timestamp; the engine operates on positional
/// indices, so no fixed bar spacing is assumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Absolute size of the open-close body.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// High-low span of the candle.
    pub fn span(&self) -> f64 {
        self.high - self.low
    }

    /// Length of the wick above the body.
    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// Length of the wick below the body.
    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// Basic OHLCV sanity check: finite fields, high/low bracket the body.
    pub fn is_sane(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}
