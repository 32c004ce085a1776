//! OKX public market-data integration.
//!
//! Read-only: the ticker listing supplies the instrument universe and the
//! candle endpoint supplies OHLCV history.
//!
//! API docs: https://www.okx.com/docs-v5/en/#public-data-rest-api
//! Base URL: https://www.okx.com/api/v5/market/
//! Auth: Not required for market data.
//! Envelope: `{"code": "0", "msg": "", "data": [...]}`; a non-zero code
//! signals an error even on HTTP 200.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{MarketDataSource, RawCandle};
use crate::config::ExchangeConfig;
use crate::types::{ScanError, Timeframe};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const SOURCE_NAME: &str = "okx";

const TICKERS_PATH: &str = "/api/v5/market/tickers";
const CANDLES_PATH: &str = "/api/v5/market/candles";

// ---------------------------------------------------------------------------
// API response types (OKX JSON → Rust)
// ---------------------------------------------------------------------------

/// Common response envelope. `data` is optional so a missing field can be
/// told apart from an empty list.
#[derive(Debug, Deserialize)]
struct OkxEnvelope<T> {
    #[serde(default)]
    code: String,
    #[serde(default)]
    msg: String,
    data: Option<Vec<T>>,
}

impl<T> OkxEnvelope<T> {
    /// Fail on an OKX-level error code.
    fn check(&self, what: &str) -> Result<(), ScanError> {
        if !self.code.is_empty() && self.code != "0" {
            return Err(ScanError::data_source(
                SOURCE_NAME,
                format!("{what}: OKX error code {}: {}", self.code, self.msg),
            ));
        }
        Ok(())
    }
}

/// Ticker record. Only the instrument identifier is needed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OkxTicker {
    inst_id: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// OKX market-data client.
pub struct OkxClient {
    http: Client,
    base_url: String,
    inst_type: String,
}

impl OkxClient {
    /// Create a new OKX client from the exchange section of the config.
    pub fn new(cfg: &ExchangeConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(cfg.request_timeout())
            .user_agent(concat!("candle-scanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for OKX")?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            inst_type: cfg.inst_type.clone(),
        })
    }

    pub fn tickers_url(&self) -> String {
        format!(
            "{}{TICKERS_PATH}?instType={}",
            self.base_url,
            urlencoding::encode(&self.inst_type)
        )
    }

    /// Candle history URL. OKX bar codes are case-sensitive, so the bar
    /// goes out as `1H`/`4H`/`1D` rather than the user-facing `1h`/`4h`/`1d`.
    pub fn candles_url(&self, inst_id: &str, timeframe: Timeframe, limit: u32) -> String {
        format!(
            "{}{CANDLES_PATH}?instId={}&bar={}&limit={}",
            self.base_url,
            urlencoding::encode(inst_id),
            timeframe.as_okx_bar(),
            limit,
        )
    }

    // -- Internal helpers ------------------------------------------------

    /// GET a URL and return the body, mapping transport failures and
    /// non-2xx statuses to data-source errors.
    async fn get_text(&self, url: &str, what: &str) -> Result<String, ScanError> {
        debug!(url = %url, "Fetching OKX {what}");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ScanError::data_source(SOURCE_NAME, format!("{what}: request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScanError::data_source(
                SOURCE_NAME,
                format!("{what}: HTTP {status}: {body}"),
            ));
        }

        resp.text()
            .await
            .map_err(|e| ScanError::data_source(SOURCE_NAME, format!("{what}: failed to read body: {e}")))
    }

    /// Decode a ticker listing body into instrument identifiers.
    ///
    /// A missing `data` field is malformed; the listing always carries one.
    fn parse_tickers(body: &str) -> Result<Vec<String>, ScanError> {
        let envelope: OkxEnvelope<OkxTicker> = serde_json::from_str(body).map_err(|e| {
            ScanError::data_source(SOURCE_NAME, format!("tickers: unexpected response shape: {e}"))
        })?;
        envelope.check("tickers")?;

        let tickers = envelope.data.ok_or_else(|| {
            ScanError::data_source(SOURCE_NAME, "tickers: response missing data field")
        })?;

        Ok(tickers.into_iter().map(|t| t.inst_id).collect())
    }

    /// Decode a candle body into raw rows, newest first.
    ///
    /// A missing or empty `data` field yields no rows.
    fn parse_candles(inst_id: &str, body: &str) -> Result<Vec<RawCandle>, ScanError> {
        let envelope: OkxEnvelope<RawCandle> = serde_json::from_str(body).map_err(|e| {
            ScanError::data_source(SOURCE_NAME, format!("candles {inst_id}: unexpected response shape: {e}"))
        })?;
        envelope.check(&format!("candles {inst_id}"))?;
        Ok(envelope.data.unwrap_or_default())
    }
}

#[async_trait]
impl MarketDataSource for OkxClient {
    async fn fetch_instrument_ids(&self) -> Result<Vec<String>, ScanError> {
        let body = self.get_text(&self.tickers_url(), "tickers").await?;
        let ids = Self::parse_tickers(&body)?;
        debug!(count = ids.len(), inst_type = %self.inst_type, "OKX tickers fetched");
        Ok(ids)
    }

    async fn fetch_candle_rows(
        &self,
        inst_id: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<Vec<RawCandle>, ScanError> {
        let url = self.candles_url(inst_id, timeframe, limit);
        let body = self.get_text(&url, "candles").await?;
        Self::parse_candles(inst_id, &body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
