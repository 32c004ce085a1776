//! Scan universe: every instrument quoted in the configured asset.

use std::sync::Arc;
use tracing::{debug, info};

use crate::exchange::MarketDataSource;
use crate::types::{ScanError, Symbol};

/// Lists the symbols a scan run iterates over.
pub struct SymbolLister {
    source: Arc<dyn MarketDataSource>,
    quote_asset: String,
}

impl SymbolLister {
    pub fn new(source: Arc<dyn MarketDataSource>, quote_asset: impl Into<String>) -> Self {
        Self {
            source,
            quote_asset: quote_asset.into(),
        }
    }

    pub fn quote_asset(&self) -> &str {
        &self.quote_asset
    }

    /// One request for the full ticker universe, filtered to identifiers
    /// ending in the quote asset. Exchange order is kept. No retry.
    pub async fn list_symbols(&self) -> Result<Vec<Symbol>, ScanError> {
        let ids = self.source.fetch_instrument_ids().await?;
        let total = ids.len();

        let symbols: Vec<Symbol> = ids
            .into_iter()
            .filter(|id| id.ends_with(&self.quote_asset))
            .collect();

        debug!(total, kept = symbols.len(), quote = %self.quote_asset, "Instruments filtered");
        info!(count = symbols.len(), quote = %self.quote_asset, "Symbols listed");
        Ok(symbols)
    }
}
