//! Serializable run configuration.
//!
//! A `RunConfig` captures everything needed to reproduce a backtest: the
//! strategy id and its parameters, the account's starting capital, and the
//! cost model. Loaded from TOML, with account and cost sections optional.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::execution::CostModel;
use crate::strategy::StrategyParams;

/// Unique identifier for a run configuration (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Complete configuration for a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub costs: CostConfig,
}

/// Strategy id and its parameter overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyConfig {
    pub name: String,
    #[serde(default)]
    pub params: StrategyParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountConfig {
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            initial_capital: default_initial_capital(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostConfig {
    #[serde(default = "default_fee_rate")]
    pub fee_rate: f64,
    #[serde(default = "default_slippage_rate")]
    pub slippage_rate: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            fee_rate: default_fee_rate(),
            slippage_rate: default_slippage_rate(),
        }
    }
}

fn default_initial_capital() -> f64 {
    10_000.0
}

fn default_fee_rate() -> f64 {
    0.001
}

fn default_slippage_rate() -> f64 {
    0.001
}

impl RunConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.costs.fee_rate, self.costs.slippage_rate)
    }

    /// Deterministic hash id for this configuration.
    ///
    /// Identical configs hash identically (parameters live in a `BTreeMap`,
    /// so serialization order is stable), which lets run artifacts be keyed
    /// by config.
    pub fn run_id(&self) -> RunId {
        // BTreeMap-backed params keep the JSON deterministic.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
