//! Exchange integrations.
//!
//! Defines the `MarketDataSource` trait, the read-only HTTP seam the scan
//! engine talks to, and provides the OKX implementation. Sources return
//! wire-shaped data; filtering, normalization and caching live in the
//! engine.

pub mod okx;

use async_trait::async_trait;

use crate::types::{ScanError, Timeframe};

/// One candle record exactly as the exchange sends it: positional string
/// fields starting with `[ts_ms, open, high, low, close, volume, ...]`.
pub type RawCandle = Vec<String>;

/// Abstraction over a public market-data REST API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Identifiers of every instrument in the exchange's spot universe, in
    /// exchange order.
    async fn fetch_instrument_ids(&self) -> Result<Vec<String>, ScanError>;

    /// Up to `limit` most recent candles for one instrument, newest first.
    /// An empty vector means the exchange returned no data.
    async fn fetch_candle_rows(
        &self,
        inst_id: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<Vec<RawCandle>, ScanError>;
}
