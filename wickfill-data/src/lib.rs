//! Wickfill Data — OHLCV supply for the backtesting engine.
//!
//! This crate owns everything between an exchange and a clean candle series:
//! - Provider trait with the Binance klines backend
//! - Retry with multiplicative backoff
//! - Request-keyed in-memory caching via `HistoricalFeed`
//! - Series canonicalization (validate, sort, dedupe)
//! - CSV ingest and export for offline workflows

pub mod binance;
pub mod cache;
pub mod canonicalize;
pub mod ingest;
pub mod provider;
pub mod retry;

pub use cache::HistoricalFeed;
pub use provider::{provider_for, DataError, OhlcvProvider, OhlcvRequest};
pub use retry::RetryPolicy;
