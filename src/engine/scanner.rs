//! Pattern scan orchestrator.
//!
//! Lists the symbol universe, fetches candles for every symbol, runs the
//! selected recognizer on each series and collects the symbols whose
//! newest bar carries a signal.
//!
//! A listing failure ends the run. Per-symbol fetch failures, empty
//! histories and short series are counted and skipped so one bad symbol
//! never stops the scan.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::engine::fetcher::{validate_limit, CandleCache, CandleFetcher};
use crate::engine::symbols::SymbolLister;
use crate::exchange::MarketDataSource;
use crate::patterns::PatternDetector;
use crate::types::{Match, ScanError, ScanReport, ScanRequest};

/// What happened to one symbol during a run.
#[derive(Debug)]
enum SymbolOutcome {
    Matched(Match),
    NoPattern,
    /// No data, or fewer bars than the minimum.
    Skipped,
    /// Candle fetch failed.
    Failed,
}

/// Runs pattern scans over the exchange's quote-asset universe.
pub struct Scanner {
    lister: SymbolLister,
    fetcher: CandleFetcher,
    detector: PatternDetector,
    candle_limit: u32,
    min_bars: usize,
    concurrency: usize,
}

impl Scanner {
    /// Create a scanner over `source`. The cache is passed in so it can
    /// outlive a single run.
    pub fn new(source: Arc<dyn MarketDataSource>, cache: Arc<CandleCache>, cfg: &ScanConfig) -> Self {
        Self {
            lister: SymbolLister::new(source.clone(), cfg.quote_asset.clone()),
            fetcher: CandleFetcher::new(source, cache),
            detector: PatternDetector::new(),
            candle_limit: cfg.candle_limit,
            min_bars: cfg.min_bars,
            concurrency: cfg.concurrency.max(1),
        }
    }

    pub fn fetcher(&self) -> &CandleFetcher {
        &self.fetcher
    }

    pub fn quote_asset(&self) -> &str {
        self.lister.quote_asset()
    }

    /// Parse user-supplied timeframe and pattern names, then scan.
    ///
    /// Unknown names fail with a configuration error before the symbol
    /// universe is requested.
    pub async fn run_named(&self, timeframe: &str, pattern: &str) -> Result<ScanReport, ScanError> {
        let request = ScanRequest::parse(timeframe, pattern)?;
        self.run(&request).await
    }

    /// Scan every listed symbol for `request.pattern` on the newest bar.
    ///
    /// Matches are returned in symbol-list order. With `concurrency > 1`
    /// symbols are fetched in parallel but results are still collected
    /// in list order and reported only once all symbols are done.
    pub async fn run(&self, request: &ScanRequest) -> Result<ScanReport, ScanError> {
        validate_limit(self.candle_limit)?;

        let started_at = Utc::now();
        info!(
            pattern = %request.pattern,
            timeframe = %request.timeframe,
            concurrency = self.concurrency,
            "Starting pattern scan"
        );

        let evicted = self.fetcher.cache().evict_expired().await;
        if evicted > 0 {
            debug!(evicted, "Dropped expired candle cache entries");
        }

        let symbols = self.lister.list_symbols().await?;

        let outcomes: Vec<SymbolOutcome> = stream::iter(symbols.iter())
            .map(|symbol| self.scan_symbol(symbol, request))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = ScanReport {
            request: *request,
            matches: Vec::new(),
            symbols_total: symbols.len(),
            symbols_evaluated: 0,
            symbols_skipped: 0,
            symbols_failed: 0,
            started_at,
            finished_at: started_at,
        };

        for outcome in outcomes {
            match outcome {
                SymbolOutcome::Matched(m) => {
                    report.symbols_evaluated += 1;
                    report.matches.push(m);
                }
                SymbolOutcome::NoPattern => report.symbols_evaluated += 1,
                SymbolOutcome::Skipped => report.symbols_skipped += 1,
                SymbolOutcome::Failed => report.symbols_failed += 1,
            }
        }
        report.finished_at = Utc::now();

        info!(
            symbols = report.symbols_total,
            evaluated = report.symbols_evaluated,
            skipped = report.symbols_skipped,
            failed = report.symbols_failed,
            matches = report.matches.len(),
            network_calls = self.fetcher.network_calls(),
            cache_hits = self.fetcher.cache_hits(),
            "Pattern scan complete"
        );

        Ok(report)
    }

    async fn scan_symbol(&self, symbol: &str, request: &ScanRequest) -> SymbolOutcome {
        let series = match self
            .fetcher
            .fetch(symbol, request.timeframe, self.candle_limit)
            .await
        {
            Ok(Some(series)) => series,
            Ok(None) => {
                debug!(symbol, "No candle data, skipping");
                return SymbolOutcome::Skipped;
            }
            Err(e) => {
                warn!(symbol, error = %e, "Candle fetch failed, skipping");
                return SymbolOutcome::Failed;
            }
        };

        if series.len() < self.min_bars {
            debug!(symbol, bars = series.len(), min = self.min_bars, "Too few bars, skipping");
            return SymbolOutcome::Skipped;
        }

        let signal = self.detector.detect(&series, request.pattern);
        if !signal.is_match() {
            return SymbolOutcome::NoPattern;
        }

        debug!(symbol, signal = signal.value(), "Pattern found");
        SymbolOutcome::Matched(Match {
            symbol: symbol.to_string(),
            signal,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
