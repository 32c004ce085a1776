//! Candle retrieval with time-bounded caching.
//!
//! The fetcher turns raw exchange rows into a normalized
//! [`CandleSeries`] (oldest first, five OHLCV columns, absolute
//! timestamps) and caches results per (symbol, timeframe, limit) for a
//! fixed TTL. The cache is an explicit dependency so callers decide its
//! lifetime; it is safe to share across concurrent scans
//! (last writer wins on the same key).

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::MAX_CANDLE_LIMIT;
use crate::exchange::{MarketDataSource, RawCandle};
use crate::types::{Bar, CandleSeries, ScanError, Symbol, Timeframe};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_CACHE_TTL_SECS: i64 = 3600;

/// Leading wire fields consumed: ts, open, high, low, close, volume.
const WIRE_FIELDS: usize = 6;

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: Symbol,
    pub timeframe: Timeframe,
    pub limit: u32,
}

/// A cached fetch outcome. `None` records that the exchange had no data.
pub type CachedCandles = Option<Arc<CandleSeries>>;

struct CacheEntry {
    candles: CachedCandles,
    fetched_at: DateTime<Utc>,
}

/// In-memory TTL cache of fetched series. Expiry is checked on read; no
/// capacity bound.
pub struct CandleCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl Default for CandleCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_CACHE_TTL_SECS))
    }
}

impl CandleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CachedCandles> {
        self.get_at(key, Utc::now()).await
    }

    /// Entry for `key` if it is younger than the TTL at `now`.
    pub async fn get_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<CachedCandles> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| now - entry.fetched_at < self.ttl)
            .map(|entry| entry.candles.clone())
    }

    pub async fn insert(&self, key: CacheKey, candles: CachedCandles) {
        self.insert_at(key, candles, Utc::now()).await;
    }

    /// Store (or replace) the entry for `key` as fetched at `fetched_at`.
    pub async fn insert_at(&self, key: CacheKey, candles: CachedCandles, fetched_at: DateTime<Utc>) {
        self.entries
            .write()
            .await
            .insert(key, CacheEntry { candles, fetched_at });
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn evict_expired(&self) -> usize {
        self.evict_expired_at(Utc::now()).await
    }

    pub async fn evict_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now - entry.fetched_at < self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Retrieves normalized candle history, consulting the cache first.
pub struct CandleFetcher {
    source: Arc<dyn MarketDataSource>,
    cache: Arc<CandleCache>,
    network_calls: AtomicU64,
    cache_hits: AtomicU64,
}

impl CandleFetcher {
    pub fn new(source: Arc<dyn MarketDataSource>, cache: Arc<CandleCache>) -> Self {
        Self {
            source,
            cache,
            network_calls: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &Arc<CandleCache> {
        &self.cache
    }

    /// Most recent `limit` bars for `symbol`, oldest first.
    ///
    /// Returns `Ok(None)` when the exchange has no data for the symbol.
    /// Fetch errors are returned as-is and are not cached.
    pub async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<CachedCandles, ScanError> {
        validate_limit(limit)?;

        let key = CacheKey {
            symbol: symbol.to_string(),
            timeframe,
            limit,
        };

        if let Some(cached) = self.cache.get(&key).await {
            debug!(symbol, %timeframe, limit, "Candle cache hit");
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached);
        }

        self.network_calls.fetch_add(1, Ordering::Relaxed);
        let rows = self.source.fetch_candle_rows(symbol, timeframe, limit).await?;
        let candles = normalize(symbol, timeframe, rows)?.map(Arc::new);

        debug!(
            symbol,
            %timeframe,
            bars = candles.as_ref().map_or(0, |s| s.len()),
            "Candles fetched"
        );

        self.cache.insert(key, candles.clone()).await;
        Ok(candles)
    }

    // -- Accessors for monitoring ----------------------------------------

    /// Requests sent to the exchange (cache misses).
    pub fn network_calls(&self) -> u64 {
        self.network_calls.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Cache hit rate as a fraction (0.0 to 1.0).
    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits();
        let total = hits + self.network_calls();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Candle counts outside 1..=MAX_CANDLE_LIMIT are configuration errors.
pub fn validate_limit(limit: u32) -> Result<(), ScanError> {
    if limit == 0 || limit > MAX_CANDLE_LIMIT {
        return Err(ScanError::Configuration(format!(
            "candle limit must be within 1..={MAX_CANDLE_LIMIT}, got {limit}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Turn newest-first wire rows into an oldest-first series.
///
/// Empty input means no data (`None`). Only timestamp and the five OHLCV
/// columns are kept; trailing wire fields are ignored.
pub fn normalize(
    symbol: &str,
    timeframe: Timeframe,
    rows: Vec<RawCandle>,
) -> Result<Option<CandleSeries>, ScanError> {
    if rows.is_empty() {
        return Ok(None);
    }

    let bars = rows
        .iter()
        .rev()
        .map(|row| parse_row(symbol, row))
        .collect::<Result<Vec<_>, _>>()?;

    CandleSeries::new(symbol, timeframe, bars).map(Some)
}

fn parse_row(symbol: &str, row: &[String]) -> Result<Bar, ScanError> {
    if row.len() < WIRE_FIELDS {
        return Err(ScanError::data_source(
            symbol,
            format!("candle row has {} fields, expected at least {WIRE_FIELDS}", row.len()),
        ));
    }

    let ts_ms: i64 = row[0].trim().parse().map_err(|_| {
        ScanError::data_source(symbol, format!("invalid candle timestamp: {:?}", row[0]))
    })?;
    let timestamp = Utc.timestamp_millis_opt(ts_ms).single().ok_or_else(|| {
        ScanError::data_source(symbol, format!("candle timestamp out of range: {ts_ms}"))
    })?;

    let number = |idx: usize, name: &str| -> Result<f64, ScanError> {
        row[idx]
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ScanError::data_source(symbol, format!("invalid candle {name}: {:?}", row[idx])))
    };

    Ok(Bar {
        timestamp,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
        volume: number(5, "volume")?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
