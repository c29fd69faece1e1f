//! CSV ingest and export.
//!
//! Candle files are the offline path around the exchange: one row per
//! candle, RFC 3339 timestamps, headers matching the struct field names.
//! Trade exports use the same layout and exist so runs can be inspected in
//! spreadsheet tools.

use std::path::Path;

use wickfill_core::domain::{Candle, Trade};

use crate::provider::DataError;

/// Read a candle series from a CSV file, as stored: no sorting or
/// validation is applied here.
pub fn read_candles(path: impl AsRef<Path>) -> Result<Vec<Candle>, DataError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut candles = Vec::new();
    for row in reader.deserialize() {
        candles.push(row?);
    }
    Ok(candles)
}

/// Write a candle series to a CSV file with a header row.
pub fn write_candles(path: impl AsRef<Path>, series: &[Candle]) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_path(path)?;
    for candle in series {
        writer.serialize(candle)?;
    }
    writer.flush()?;
    Ok(())
}

/// Export a closed trade list to a CSV file with a header row.
pub fn export_trades(path: impl AsRef<Path>, trades: &[Trade]) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_path(path)?;
    for trade in trades {
        writer.serialize(trade)?;
    }
    writer.flush()?;
    Ok(())
}
