//! Wickfill Core — domain types, wick-fill signal detection, trade
//! simulation, and performance aggregation.
//!
//! This crate contains the heart of the backtesting engine:
//! - Domain types (candles, trades)
//! - Wick-fill signal detection with the range-bound market gate
//! - Trade simulation: next-bar-open entry, stop/target/time exits, fees,
//!   slippage, and compounding capital
//! - Performance aggregation into a fixed six-metric report
//! - String-keyed strategy registry
//! - Run configuration and fingerprinting for deterministic replay

pub mod config;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod strategy;

pub use engine::{backtest, backtest_with, EngineError, PerformanceReport};
