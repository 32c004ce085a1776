//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every key has a default, so a missing file simply yields the stock
//! OKX/USDT setup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::types::ScanError;

/// OKX caps the candle endpoint at 300 rows per request.
pub const MAX_CANDLE_LIMIT: u32 = 300;

/// Longest accepted candle cache TTL (one week).
pub const MAX_CACHE_TTL_SECS: u64 = 7 * 24 * 3600;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub exchange: ExchangeConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExchangeConfig {
    pub base_url: String,
    /// Instrument type passed to the ticker listing.
    pub inst_type: String,
    pub request_timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.okx.com".to_string(),
            inst_type: "SPOT".to_string(),
            request_timeout_secs: 15,
        }
    }
}

impl ExchangeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScanConfig {
    /// Symbols must end with this suffix to enter the scan universe.
    pub quote_asset: String,
    /// Most-recent bars requested per symbol.
    pub candle_limit: u32,
    /// Series shorter than this are skipped.
    pub min_bars: usize,
    pub cache_ttl_secs: u64,
    /// Symbols processed at once. 1 = strictly sequential.
    pub concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            quote_asset: "USDT".to_string(),
            candle_limit: 100,
            min_bars: 10,
            cache_ttl_secs: 3600,
            concurrency: 1,
        }
    }
}

impl ScanConfig {
    /// Cache TTL, clamped to `MAX_CACHE_TTL_SECS`.
    pub fn cache_ttl(&self) -> chrono::Duration {
        let secs = self.cache_ttl_secs.min(MAX_CACHE_TTL_SECS) as i64;
        chrono::Duration::try_seconds(secs).unwrap_or_else(chrono::Duration::zero)
    }

    /// Reject values the scanner cannot run with.
    pub fn validate(&self) -> std::result::Result<(), ScanError> {
        if self.quote_asset.trim().is_empty() {
            return Err(ScanError::Configuration("scan.quote_asset must not be empty".into()));
        }
        if self.candle_limit == 0 || self.candle_limit > MAX_CANDLE_LIMIT {
            return Err(ScanError::Configuration(format!(
                "scan.candle_limit must be within 1..={MAX_CANDLE_LIMIT}, got {}",
                self.candle_limit
            )));
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ScanError::Configuration(format!(
                "scan.cache_ttl_secs must be at most {MAX_CACHE_TTL_SECS}, got {}",
                self.cache_ttl_secs
            )));
        }
        if self.min_bars == 0 {
            return Err(ScanError::Configuration("scan.min_bars must be at least 1".into()));
        }
        if self.concurrency == 0 {
            return Err(ScanError::Configuration("scan.concurrency must be at least 1".into()));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!(path, "No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Invalid TOML")?;
        config.scan.validate()?;
        Ok(config)
    }
}
