//! Data provider trait and structured error types.
//!
//! The OhlcvProvider trait abstracts over exchange backends so the feed can
//! swap implementations and tests can substitute scripted providers. Only
//! Binance is wired up today; any other exchange id is a structured error,
//! not a panic.

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;
use wickfill_core::domain::Candle;

use crate::binance::BinanceProvider;

/// Default `since` when a request leaves it unset: 2023-01-01T00:00:00Z.
pub const DEFAULT_SINCE_MS: i64 = 1_672_531_200_000;

/// One historical OHLCV request, and the cache key for its result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OhlcvRequest {
    /// Unified symbol, slash-separated ("BTC/USDT").
    pub symbol: String,
    /// Exchange timeframe token ("1m", "1h", "1d").
    pub timeframe: String,
    /// Earliest candle open time, unix milliseconds.
    pub since: Option<i64>,
    /// Maximum number of candles.
    pub limit: usize,
}

impl OhlcvRequest {
    pub fn new(symbol: &str, timeframe: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            since: None,
            limit: 500,
        }
    }

    pub fn since(mut self, since_ms: i64) -> Self {
        self.since = Some(since_ms);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// The `since` actually sent to the exchange.
    pub fn resolved_since(&self) -> i64 {
        self.since.unwrap_or(DEFAULT_SINCE_MS)
    }

    /// Start of the request window as a timestamp.
    pub fn since_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.resolved_since()).single()
    }
}

impl Default for OhlcvRequest {
    fn default() -> Self {
        Self::new("BTC/USDT", "1h")
    }
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by exchange (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("empty response for {symbol}")]
    EmptyResponse { symbol: String },

    #[error("exchange '{0}' is not supported yet")]
    UnsupportedExchange(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A source of historical OHLCV candles.
pub trait OhlcvProvider: std::fmt::Debug {
    /// Human-readable backend id ("binance").
    fn name(&self) -> &str;

    /// Fetch candles for `request`, oldest first.
    fn fetch_ohlcv(&self, request: &OhlcvRequest) -> Result<Vec<Candle>, DataError>;
}

/// Construct the provider registered for `exchange_id`.
pub fn provider_for(exchange_id: &str) -> Result<Box<dyn OhlcvProvider>, DataError> {
    match exchange_id {
        "binance" => Ok(Box::new(BinanceProvider::new())),
        other => Err(DataError::UnsupportedExchange(other.to_string())),
    }
}
