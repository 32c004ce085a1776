//! Full-pipeline scan scenarios: listing → fetch → normalize → detect →
//! aggregate → render.

use std::sync::Arc;

use candle_scanner::config::ScanConfig;
use candle_scanner::engine::fetcher::CandleCache;
use candle_scanner::engine::scanner::Scanner;
use candle_scanner::report;
use candle_scanner::types::{Direction, PatternKind, ScanRequest, Signal, Timeframe};

use crate::mock_exchange::{ending_in_bearish_engulfing, ending_in_hammer, flat, MockExchange};

fn scanner_for(exchange: &Arc<MockExchange>, cfg: &ScanConfig) -> Scanner {
    Scanner::new(exchange.clone(), Arc::new(CandleCache::new(cfg.cache_ttl())), cfg)
}

fn hammer_1h() -> ScanRequest {
    ScanRequest::new(Timeframe::OneHour, PatternKind::Hammer)
}

#[tokio::test]
async fn test_one_bullish_match_among_two() {
    let exchange = Arc::new(
        MockExchange::new()
            .with_symbol("X-USDT", flat(100))
            .with_symbol("Y-USDT", ending_in_hammer(99)),
    );
    let scanner = scanner_for(&exchange, &ScanConfig::default());

    let report = scanner.run(&hammer_1h()).await.unwrap();

    assert_eq!(report.match_count(), 1);
    assert_eq!(report.matches[0].symbol, "Y-USDT");
    assert_eq!(report.matches[0].signal, Signal(100));
    assert_eq!(report.matches[0].direction(), Direction::Bullish);

    let text = report::render_text(&report);
    assert!(text.contains("Found 1 symbol(s) with pattern 'hammer' on 1h:"));
    assert!(text.contains("- Y-USDT (Bullish)"));
}

#[tokio::test]
async fn test_failed_fetch_yields_empty_result() {
    let exchange = Arc::new(MockExchange::new().with_failing_symbol("X-USDT", "connection reset"));
    let scanner = scanner_for(&exchange, &ScanConfig::default());

    let report = scanner.run(&hammer_1h()).await.unwrap();

    assert!(report.is_empty());
    assert_eq!(report.symbols_failed, 1);
    assert!(report::render_text(&report).starts_with("Nothing found."));
}

#[tokio::test]
async fn test_empty_candle_data_is_skipped() {
    let exchange = Arc::new(
        MockExchange::new()
            .with_symbol("X-USDT", Vec::new())
            .with_symbol("Y-USDT", ending_in_hammer(20)),
    );
    let scanner = scanner_for(&exchange, &ScanConfig::default());

    let report = scanner.run(&hammer_1h()).await.unwrap();

    assert_eq!(report.symbols_skipped, 1);
    assert_eq!(report.symbols_failed, 0);
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].symbol, "Y-USDT");
}

#[tokio::test]
async fn test_unknown_pattern_never_lists_symbols() {
    let exchange = Arc::new(MockExchange::new().with_symbol("X-USDT", ending_in_hammer(20)));
    let scanner = scanner_for(&exchange, &ScanConfig::default());

    let err = scanner.run_named("1h", "unknown_pattern").await.unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(exchange.listing_calls(), 0);
    assert_eq!(exchange.total_candle_calls(), 0);
}

#[tokio::test]
async fn test_listing_failure_aborts_run() {
    let exchange = Arc::new(
        MockExchange::new()
            .with_symbol("X-USDT", ending_in_hammer(20))
            .fail_listing("HTTP 503"),
    );
    let scanner = scanner_for(&exchange, &ScanConfig::default());

    let err = scanner.run(&hammer_1h()).await.unwrap_err();

    assert!(err.is_data_source());
    assert_eq!(exchange.total_candle_calls(), 0);
}

#[tokio::test]
async fn test_non_quote_pairs_are_never_fetched() {
    let exchange = Arc::new(
        MockExchange::new()
            .with_symbol("ETH-BTC", ending_in_hammer(20))
            .with_symbol("BTC-USDT", ending_in_hammer(20)),
    );
    let scanner = scanner_for(&exchange, &ScanConfig::default());

    let report = scanner.run(&hammer_1h()).await.unwrap();

    assert_eq!(report.symbols_total, 1);
    assert_eq!(exchange.candle_calls("ETH-BTC"), 0);
    assert_eq!(report.matches[0].symbol, "BTC-USDT");
}

#[tokio::test]
async fn test_bearish_label() {
    let exchange = Arc::new(MockExchange::new().with_symbol("SOL-USDT", ending_in_bearish_engulfing(30)));
    let scanner = scanner_for(&exchange, &ScanConfig::default());

    let report = scanner
        .run(&ScanRequest::new(Timeframe::FourHours, PatternKind::Engulfing))
        .await
        .unwrap();

    assert_eq!(report.matches[0].signal, Signal(-100));
    assert!(report::render_text(&report).contains("- SOL-USDT (Bearish)"));
}

#[tokio::test]
async fn test_only_latest_limit_bars_are_used() {
    // 150 bars ending in a hammer; with a limit of 100 the hammer is still
    // the newest bar and is found.
    let exchange = Arc::new(MockExchange::new().with_symbol("BTC-USDT", ending_in_hammer(149)));
    let scanner = scanner_for(&exchange, &ScanConfig::default());

    let report = scanner.run(&hammer_1h()).await.unwrap();
    assert_eq!(report.match_count(), 1);
}

#[tokio::test]
async fn test_repeat_run_within_ttl_uses_cache() {
    let exchange = Arc::new(
        MockExchange::new()
            .with_symbol("X-USDT", flat(50))
            .with_symbol("Y-USDT", ending_in_hammer(50)),
    );
    let scanner = scanner_for(&exchange, &ScanConfig::default());

    scanner.run(&hammer_1h()).await.unwrap();
    let second = scanner.run(&hammer_1h()).await.unwrap();

    assert_eq!(second.match_count(), 1);
    assert_eq!(exchange.listing_calls(), 2);
    assert_eq!(exchange.candle_calls("X-USDT"), 1);
    assert_eq!(exchange.candle_calls("Y-USDT"), 1);
}

#[tokio::test]
async fn test_other_timeframe_is_a_separate_cache_entry() {
    let exchange = Arc::new(MockExchange::new().with_symbol("Y-USDT", ending_in_hammer(50)));
    let scanner = scanner_for(&exchange, &ScanConfig::default());

    scanner.run(&hammer_1h()).await.unwrap();
    scanner
        .run(&ScanRequest::new(Timeframe::OneDay, PatternKind::Hammer))
        .await
        .unwrap();

    assert_eq!(exchange.candle_calls("Y-USDT"), 2);
}

#[tokio::test]
async fn test_concurrent_scan_matches_sequential() {
    let build = || {
        let mut exchange = MockExchange::new();
        for i in 0..24 {
            let symbol = format!("C{i:02}-USDT");
            exchange = match i % 4 {
                0 => exchange.with_symbol(&symbol, ending_in_hammer(30)),
                1 => exchange.with_failing_symbol(&symbol, "timeout"),
                2 => exchange.with_symbol(&symbol, flat(5)),
                _ => exchange.with_symbol(&symbol, flat(30)),
            };
        }
        Arc::new(exchange)
    };

    let sequential = build();
    let parallel = build();
    let seq_report = scanner_for(&sequential, &ScanConfig::default())
        .run(&hammer_1h())
        .await
        .unwrap();
    let par_cfg = ScanConfig {
        concurrency: 8,
        ..ScanConfig::default()
    };
    let par_report = scanner_for(&parallel, &par_cfg).run(&hammer_1h()).await.unwrap();

    assert_eq!(seq_report.matches, par_report.matches);
    assert_eq!(par_report.match_count(), 6);
    assert_eq!(par_report.symbols_failed, 6);
    assert_eq!(par_report.symbols_skipped, 6);
    assert_eq!(par_report.symbols_evaluated, 12);
}
