//! Candle scanner entry point.
//!
//! Parses the scan request, loads configuration, initialises structured
//! logging, runs one scan over the exchange's quote-asset pairs and
//! prints the matches.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use candle_scanner::config::AppConfig;
use candle_scanner::engine::fetcher::CandleCache;
use candle_scanner::engine::scanner::Scanner;
use candle_scanner::exchange::okx::OkxClient;
use candle_scanner::report;
use candle_scanner::types::{PatternKind, ScanRequest, Timeframe};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bar interval: 1h, 4h or 1d
    #[arg(long, default_value = "1h")]
    timeframe: String,

    /// Pattern: hammer, doji, engulfing, morning_star or evening_star
    #[arg(long, default_value = "hammer")]
    pattern: String,

    /// Path to the TOML config (defaults are used when it is missing)
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// List the supported patterns and timeframes, then exit
    #[arg(long, default_value_t = false)]
    list_patterns: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    init_logging();

    if cli.list_patterns {
        print_catalogue();
        return Ok(());
    }

    // Validate the selection before touching config or network.
    let request = ScanRequest::parse(&cli.timeframe, &cli.pattern)?;

    let cfg = AppConfig::load_or_default(&cli.config)?;
    info!(
        exchange = %cfg.exchange.base_url,
        quote = %cfg.scan.quote_asset,
        candle_limit = cfg.scan.candle_limit,
        cache_ttl_secs = cfg.scan.cache_ttl_secs,
        "Candle scanner starting"
    );

    let client = OkxClient::new(&cfg.exchange)?;
    let cache = Arc::new(CandleCache::new(cfg.scan.cache_ttl()));
    let scanner = Scanner::new(Arc::new(client), cache, &cfg.scan);

    eprintln!(
        "Scanning {} pairs for '{}' on {}...",
        scanner.quote_asset(),
        request.pattern,
        request.timeframe
    );

    let report = scanner
        .run(&request)
        .await
        .context("Scan aborted before any symbol was checked")?;

    if cli.json {
        println!("{}", report::render_json(&report).context("Failed to serialise report")?);
    } else {
        print!("{}", report::render_text(&report));
    }

    Ok(())
}

fn print_catalogue() {
    let patterns: Vec<&str> = PatternKind::ALL.iter().map(|p| p.as_str()).collect();
    let timeframes: Vec<&str> = Timeframe::ALL.iter().map(|t| t.as_str()).collect();
    println!("patterns:   {}", patterns.join(", "));
    println!("timeframes: {}", timeframes.join(", "));
}

/// Initialise the `tracing` subscriber. Logs go to stderr so stdout only
/// carries the report.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("candle_scanner=info"));

    let json_logging = std::env::var("SCANNER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
