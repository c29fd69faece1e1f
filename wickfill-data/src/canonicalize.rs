//! Series canonicalization: validate, sort, dedupe.
//!
//! Exchange responses occasionally contain malformed rows, out-of-order
//! pages, or duplicated candles at page boundaries. Everything downstream
//! assumes a clean, strictly ordered series, so all fetched data passes
//! through here first.

use tracing::debug;
use wickfill_core::domain::Candle;

/// Produce a clean series: insane candles dropped, sorted by timestamp,
/// duplicate timestamps collapsed to their first occurrence.
pub fn canonicalize(mut series: Vec<Candle>) -> Vec<Candle> {
    let before = series.len();
    series.retain(Candle::is_sane);
    series.sort_by_key(|c| c.timestamp);
    series.dedup_by_key(|c| c.timestamp);
    if series.len() != before {
        debug!(before, after = series.len(), "canonicalized series");
    }
    series
}
