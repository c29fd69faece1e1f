//! Strategy registry — maps strategy identifiers to constructors.
//!
//! Consumers name a strategy by string id ("wick_fill") and hand over the
//! series, a parameter bag, and account settings; the registry owns the
//! mapping from id to concrete type. Unknown ids are an error, never a
//! silent fallback.

use std::collections::BTreeMap;

use crate::domain::Candle;
use crate::engine::execution::CostModel;
use crate::engine::EngineError;
use crate::strategy::wick_fill::WickFillStrategy;
use crate::strategy::{Strategy, StrategyParams};

/// Constructor signature every registered strategy must satisfy.
pub type StrategyCtor =
    for<'a> fn(&'a [Candle], &StrategyParams, CostModel, f64) -> Box<dyn Strategy + 'a>;

/// String-keyed strategy lookup. BTreeMap keeps `names()` deterministic.
#[derive(Default)]
pub struct StrategyRegistry {
    ctors: BTreeMap<String, StrategyCtor>,
}

impl StrategyRegistry {
    /// Empty registry with no strategies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every built-in strategy.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("wick_fill", build_wick_fill);
        registry
    }

    /// Register a constructor under `id`, replacing any previous entry.
    pub fn register(&mut self, id: &str, ctor: StrategyCtor) {
        self.ctors.insert(id.to_string(), ctor);
    }

    /// Instantiate the strategy registered under `id`.
    pub fn build<'a>(
        &self,
        id: &str,
        series: &'a [Candle],
        params: &StrategyParams,
        costs: CostModel,
        initial_capital: f64,
    ) -> Result<Box<dyn Strategy + 'a>, EngineError> {
        let ctor = self
            .ctors
            .get(id)
            .ok_or_else(|| EngineError::UnknownStrategy(id.to_string()))?;
        Ok(ctor(series, params, costs, initial_capital))
    }

    /// Registered ids in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.ctors.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ctors.contains_key(id)
    }
}

fn build_wick_fill<'a>(
    series: &'a [Candle],
    params: &StrategyParams,
    costs: CostModel,
    initial_capital: f64,
) -> Box<dyn Strategy + 'a> {
    Box::new(WickFillStrategy::from_params(
        series,
        params,
        costs,
        initial_capital,
    ))
}
