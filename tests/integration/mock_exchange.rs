//! Mock exchange for integration testing.
//!
//! Provides a deterministic `MarketDataSource` that serves a fixed
//! instrument list and canned candle responses, and counts every call.
//! Everything stays in memory; nothing touches the network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use candle_scanner::exchange::{MarketDataSource, RawCandle};
use candle_scanner::types::{ScanError, Timeframe};

/// First bar of every generated history (2023-11-14T22:13:20Z).
const T0_MS: i64 = 1_700_000_000_000;
const HOUR_MS: i64 = 3_600_000;

/// A mock exchange with fully controllable responses.
#[derive(Default)]
pub struct MockExchange {
    instruments: Vec<String>,
    candles: HashMap<String, Result<Vec<RawCandle>, ScanError>>,
    listing_error: Option<String>,
    listing_calls: AtomicUsize,
    candle_calls: Mutex<HashMap<String, usize>>,
}

impl MockExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// List `symbol` and serve `rows` for it.
    pub fn with_symbol(mut self, symbol: &str, rows: Vec<RawCandle>) -> Self {
        self.instruments.push(symbol.to_string());
        self.candles.insert(symbol.to_string(), Ok(rows));
        self
    }

    /// List `symbol` and fail every candle request for it.
    pub fn with_failing_symbol(mut self, symbol: &str, message: &str) -> Self {
        self.instruments.push(symbol.to_string());
        self.candles
            .insert(symbol.to_string(), Err(ScanError::data_source("mock", message)));
        self
    }

    /// Make the ticker listing fail.
    pub fn fail_listing(mut self, message: &str) -> Self {
        self.listing_error = Some(message.to_string());
        self
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn candle_calls(&self, symbol: &str) -> usize {
        self.candle_calls
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_candle_calls(&self) -> usize {
        self.candle_calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl MarketDataSource for MockExchange {
    async fn fetch_instrument_ids(&self) -> Result<Vec<String>, ScanError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        match &self.listing_error {
            Some(msg) => Err(ScanError::data_source("mock", msg.clone())),
            None => Ok(self.instruments.clone()),
        }
    }

    async fn fetch_candle_rows(
        &self,
        inst_id: &str,
        _timeframe: Timeframe,
        limit: u32,
    ) -> Result<Vec<RawCandle>, ScanError> {
        *self
            .candle_calls
            .lock()
            .unwrap()
            .entry(inst_id.to_string())
            .or_insert(0) += 1;

        match self.candles.get(inst_id) {
            // Newest first, capped at `limit` like the real endpoint.
            Some(Ok(rows)) => Ok(rows.iter().take(limit as usize).cloned().collect()),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(Vec::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire fixtures
// ---------------------------------------------------------------------------

/// Hourly wire rows, newest first, for oldest-first (open, high, low, close).
pub fn wire_rows(ohlc: &[(f64, f64, f64, f64)]) -> Vec<RawCandle> {
    ohlc.iter()
        .enumerate()
        .rev()
        .map(|(i, (o, h, l, c))| {
            vec![
                (T0_MS + i as i64 * HOUR_MS).to_string(),
                o.to_string(),
                h.to_string(),
                l.to_string(),
                c.to_string(),
                "1000".to_string(),
                "100000".to_string(),
                "100000".to_string(),
                "1".to_string(),
            ]
        })
        .collect()
}

const FLAT: (f64, f64, f64, f64) = (100.0, 101.5, 99.5, 101.0);

/// `n` identical small white candles. No pattern fires on these.
pub fn flat(n: usize) -> Vec<RawCandle> {
    wire_rows(&vec![FLAT; n])
}

/// `context` flat candles followed by a hammer on the newest bar.
pub fn ending_in_hammer(context: usize) -> Vec<RawCandle> {
    let mut bars = vec![FLAT; context];
    bars.push((99.6, 100.0, 98.0, 99.9));
    wire_rows(&bars)
}

/// `context` flat candles followed by a bearish engulfing bar.
pub fn ending_in_bearish_engulfing(context: usize) -> Vec<RawCandle> {
    let mut bars = vec![FLAT; context];
    bars.push((101.2, 101.4, 99.5, 99.7));
    wire_rows(&bars)
}
