//! Run fingerprinting — deterministic identification of backtest runs.
//!
//! A run is fully reproducible from its inputs, so a digest of (config,
//! series) identifies it and a digest of the trade list verifies a replay.
//! All digests are blake3 over canonical JSON; `StrategyParams` is
//! BTreeMap-backed, so serialization order is stable.

use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::domain::{Candle, Trade};
use crate::engine::PerformanceReport;

/// Hex-encoded blake3 digest.
pub type Digest = String;

fn digest_json<T: Serialize>(value: &T) -> Digest {
    let json = serde_json::to_string(value).unwrap_or_default();
    blake3::hash(json.as_bytes()).to_hex().to_string()
}

/// Digest of a candle series. Two series digest equal iff every field of
/// every candle matches.
pub fn series_digest(series: &[Candle]) -> Digest {
    digest_json(&series)
}

/// Digest of a closed trade list, in the order given.
pub fn trades_digest(trades: &[Trade]) -> Digest {
    digest_json(&trades)
}

/// Complete record of one backtest run, suitable for persistence and for
/// replay verification: re-running with the same config on a series with the
/// same digest must reproduce `trades_digest` exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFingerprint {
    pub run_id: String,
    pub series_digest: Digest,
    pub trades_digest: Digest,
    pub report: PerformanceReport,
}

impl RunFingerprint {
    pub fn new(
        config: &RunConfig,
        series: &[Candle],
        trades: &[Trade],
        report: PerformanceReport,
    ) -> Self {
        Self {
            run_id: config.run_id(),
            series_digest: series_digest(series),
            trades_digest: trades_digest(trades),
            report,
        }
    }
}
