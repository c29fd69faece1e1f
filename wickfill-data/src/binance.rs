//! Binance spot market data provider.
//!
//! Fetches OHLCV candles from the public `/api/v3/klines` endpoint. Handles
//! rate limiting, retries with multiplicative backoff, and response parsing.
//! No API key is required for historical klines.

use chrono::{TimeZone, Utc};
use serde_json::Value;
use tracing::info;
use wickfill_core::domain::Candle;

use crate::provider::{DataError, OhlcvProvider, OhlcvRequest};
use crate::retry::RetryPolicy;

const BASE_URL: &str = "https://api.binance.com";

/// Binance klines provider.
#[derive(Debug)]
pub struct BinanceProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl BinanceProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the provider at a non-default endpoint (test servers, mirrors).
    pub fn with_base_url(base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// "BTC/USDT" → "BTCUSDT".
    fn exchange_symbol(symbol: &str) -> String {
        symbol.replace('/', "").to_uppercase()
    }

    fn fetch_once(&self, request: &OhlcvRequest) -> Result<Vec<Candle>, DataError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let mut params = vec![
            ("symbol".to_string(), Self::exchange_symbol(&request.symbol)),
            ("interval".to_string(), request.timeframe.clone()),
            ("limit".to_string(), request.limit.to_string()),
        ];
        // Without startTime the exchange returns the most recent candles,
        // which is what live fetches want.
        if let Some(since) = request.since {
            params.push(("startTime".to_string(), since.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: request.symbol.clone(),
            });
        }
        if !status.is_success() {
            return Err(DataError::ResponseFormatChanged(format!(
                "unexpected http status {status}"
            )));
        }

        let rows: Vec<Vec<Value>> = response
            .json()
            .map_err(|e| DataError::ResponseFormatChanged(e.to_string()))?;
        if rows.is_empty() {
            return Err(DataError::EmptyResponse {
                symbol: request.symbol.clone(),
            });
        }

        rows.iter().map(|row| parse_kline(row)).collect()
    }
}

impl Default for BinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OhlcvProvider for BinanceProvider {
    fn name(&self) -> &str {
        "binance"
    }

    fn fetch_ohlcv(&self, request: &OhlcvRequest) -> Result<Vec<Candle>, DataError> {
        info!(
            symbol = %request.symbol,
            timeframe = %request.timeframe,
            since = request.resolved_since(),
            limit = request.limit,
            "fetching klines"
        );
        self.retry.run("binance klines", || self.fetch_once(request))
    }
}

/// One kline row: `[open_time_ms, "open", "high", "low", "close", "volume", ...]`.
/// Prices and volume arrive as strings; the trailing fields are ignored.
fn parse_kline(row: &[Value]) -> Result<Candle, DataError> {
    if row.len() < 6 {
        return Err(DataError::ResponseFormatChanged(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }
    let open_time = row[0]
        .as_i64()
        .ok_or_else(|| DataError::ResponseFormatChanged("open time is not an integer".into()))?;
    let timestamp = Utc
        .timestamp_millis_opt(open_time)
        .single()
        .ok_or_else(|| {
            DataError::ResponseFormatChanged(format!("invalid open time: {open_time}"))
        })?;

    Ok(Candle {
        timestamp,
        open: numeric_field(&row[1], "open")?,
        high: numeric_field(&row[2], "high")?,
        low: numeric_field(&row[3], "low")?,
        close: numeric_field(&row[4], "close")?,
        volume: numeric_field(&row[5], "volume")?,
    })
}

fn numeric_field(value: &Value, name: &str) -> Result<f64, DataError> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| value.as_f64())
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("bad {name} field: {value}")))
}
