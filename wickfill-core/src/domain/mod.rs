//! Domain types for the wick-fill backtesting engine.

pub mod candle;
pub mod trade;

pub use candle::Candle;
pub use trade::{Trade, TradeDirection};
