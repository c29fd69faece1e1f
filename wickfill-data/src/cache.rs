//! Historical feed with an in-memory, request-keyed cache.
//!
//! The feed is the data-supply surface the rest of the system talks to. It
//! owns a provider, memoizes historical responses by their full request key,
//! and degrades to an empty series once the provider's retries are spent —
//! callers render "no data" rather than crash.

use std::collections::HashMap;

use tracing::{error, info, warn};
use wickfill_core::domain::Candle;

use crate::canonicalize::canonicalize;
use crate::provider::{provider_for, DataError, OhlcvProvider, OhlcvRequest};

/// Cache key: every request field participates, so two requests share a
/// cache entry only when they are identical.
pub type FetchKey = (String, String, Option<i64>, usize);

fn fetch_key(request: &OhlcvRequest) -> FetchKey {
    (
        request.symbol.clone(),
        request.timeframe.clone(),
        request.since,
        request.limit,
    )
}

/// Cached historical candle feed over a single exchange provider.
pub struct HistoricalFeed {
    provider: Box<dyn OhlcvProvider>,
    cache: HashMap<FetchKey, Vec<Candle>>,
}

impl HistoricalFeed {
    pub fn new(provider: Box<dyn OhlcvProvider>) -> Self {
        Self {
            provider,
            cache: HashMap::new(),
        }
    }

    /// Feed backed by the provider registered for `exchange_id`.
    pub fn for_exchange(exchange_id: &str) -> Result<Self, DataError> {
        Ok(Self::new(provider_for(exchange_id)?))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch a historical series, canonicalized and oldest-first.
    ///
    /// With `use_cache`, an identical earlier request is answered from
    /// memory without touching the provider. A provider failure (after its
    /// own retries) yields an empty series, never an error.
    pub fn fetch_historical(&mut self, request: &OhlcvRequest, use_cache: bool) -> Vec<Candle> {
        let key = fetch_key(request);
        if use_cache {
            if let Some(cached) = self.cache.get(&key) {
                info!(symbol = %request.symbol, timeframe = %request.timeframe, "cache hit");
                return cached.clone();
            }
        }

        let resolved = request.clone().since(request.resolved_since());
        let series = match self.provider.fetch_ohlcv(&resolved) {
            Ok(raw) => canonicalize(raw),
            Err(err) => {
                error!(symbol = %request.symbol, %err, "historical fetch failed, returning empty series");
                return Vec::new();
            }
        };

        if series.is_empty() {
            warn!(symbol = %request.symbol, "fetch produced no usable candles");
            return Vec::new();
        }

        info!(symbol = %request.symbol, candles = series.len(), "fetched historical data");
        self.cache.insert(key, series.clone());
        series
    }

    /// Fetch the most recent candle for a symbol. Never cached.
    pub fn fetch_live(&self, symbol: &str, timeframe: &str) -> Option<Candle> {
        let request = OhlcvRequest::new(symbol, timeframe).limit(1);
        match self.provider.fetch_ohlcv(&request) {
            Ok(candles) => {
                let latest = candles.into_iter().next_back();
                if latest.is_none() {
                    warn!(symbol, "live fetch returned no candles");
                }
                latest.filter(Candle::is_sane)
            }
            Err(err) => {
                error!(symbol, %err, "live fetch failed");
                None
            }
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
