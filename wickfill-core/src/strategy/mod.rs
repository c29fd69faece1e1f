//! Strategy layer — signal detection plus the trait the registry dispatches on.
//!
//! A strategy is anything exposing `run() → Vec<Trade>`. Each strategy is
//! constructed with the full candle series and its own parameter set, and
//! independently owns its signal-detection and trade-simulation behavior.
//! Strategies are portfolio-agnostic beyond the running capital the simulator
//! compounds internally: they never see the caller's state.

pub mod registry;
pub mod wick_fill;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::Trade;

pub use registry::{StrategyCtor, StrategyRegistry};
pub use wick_fill::{WickFillParams, WickFillStrategy};

/// Trait for backtestable strategies.
///
/// Implementations hold a borrowed, read-only candle series and produce an
/// immutable list of closed trades. `run` is deterministic and side-effect
/// free: identical series, parameters, and costs always yield an identical
/// trade list.
pub trait Strategy: Send + Sync + std::fmt::Debug {
    /// Registry identifier (e.g., "wick_fill").
    fn name(&self) -> &str;

    /// Execute the strategy over the whole series and return the closed trades.
    fn run(&self) -> Vec<Trade>;
}

/// Named numeric parameters for a strategy run.
///
/// Uses `BTreeMap` for deterministic key ordering during serialization →
/// digests. Unspecified options fall back to per-strategy defaults via the
/// accessor methods; parameters are immutable once bound to a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyParams {
    pub params: BTreeMap<String, f64>,
}

impl StrategyParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named parameter, replacing any previous value.
    pub fn set(mut self, name: &str, value: f64) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }

    /// Named f64 parameter, falling back to `default`.
    pub fn param(&self, name: &str, default: f64) -> f64 {
        self.params.get(name).copied().unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Named usize parameter, falling back to `default`.
    pub fn param_usize(&self, name: &str, default: usize) -> usize {
        self.params
            .get(name)
            .copied()
            .map(|v| v as usize)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_returns_value_if_present() {
        let p = StrategyParams::new().set("wick_threshold", 0.8);
        assert_eq!(p.param("wick_threshold", 0.5), 0.8);
    }

    #[test]
    fn param_returns_default_if_missing() {
        let p = StrategyParams::new();
        assert_eq!(p.param("wick_threshold", 0.5), 0.5);
    }

    #[test]
    fn param_usize_returns_value_if_present() {
        let p = StrategyParams::new().set("range_window", 30.0);
        assert_eq!(p.param_usize("range_window", 20), 30);
    }

    #[test]
    fn param_usize_returns_default_if_missing() {
        let p = StrategyParams::new();
        assert_eq!(p.param_usize("range_window", 20), 20);
    }

    #[test]
    fn serializes_as_flat_table() {
        let p = StrategyParams::new().set("a", 1.0).set("b", 2.0);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"a":1.0,"b":2.0}"#);
    }
}
