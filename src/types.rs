//! Shared types for the candle scanner.
//!
//! These types form the data model passed between the exchange client,
//! the fetch/cache layer, the pattern recognizers and the scan
//! orchestrator. They carry no I/O so every module can depend on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exchange instrument identifier, e.g. `"BTC-USDT"`.
pub type Symbol = String;

// ---------------------------------------------------------------------------
// Timeframe
// ---------------------------------------------------------------------------

/// Bar interval selected once per scan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl Timeframe {
    pub const ALL: &'static [Timeframe] =
        &[Timeframe::OneHour, Timeframe::FourHours, Timeframe::OneDay];

    /// Duration of one bar in seconds.
    pub fn bar_seconds(self) -> u64 {
        match self {
            Timeframe::OneHour => 3_600,
            Timeframe::FourHours => 14_400,
            Timeframe::OneDay => 86_400,
        }
    }

    /// User-facing name ("1h", "4h", "1d").
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1d",
        }
    }

    /// Interval code for the OKX `bar` query parameter. OKX codes are
    /// case-sensitive: hour and day intervals are upper-case.
    pub fn as_okx_bar(self) -> &'static str {
        match self {
            Timeframe::OneHour => "1H",
            Timeframe::FourHours => "4H",
            Timeframe::OneDay => "1D",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Timeframe {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1h" => Ok(Timeframe::OneHour),
            "4h" => Ok(Timeframe::FourHours),
            "1d" => Ok(Timeframe::OneDay),
            _ => Err(ScanError::Configuration(format!(
                "Unknown timeframe: {s} (expected one of 1h, 4h, 1d)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern kind
// ---------------------------------------------------------------------------

/// Candlestick patterns the scanner can look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Hammer,
    Doji,
    Engulfing,
    MorningStar,
    EveningStar,
}

impl PatternKind {
    pub const ALL: &'static [PatternKind] = &[
        PatternKind::Hammer,
        PatternKind::Doji,
        PatternKind::Engulfing,
        PatternKind::MorningStar,
        PatternKind::EveningStar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::Hammer => "hammer",
            PatternKind::Doji => "doji",
            PatternKind::Engulfing => "engulfing",
            PatternKind::MorningStar => "morning_star",
            PatternKind::EveningStar => "evening_star",
        }
    }

    /// Number of consecutive bars the pattern shape spans, including the
    /// bar it is reported on.
    pub fn bars_spanned(self) -> usize {
        match self {
            PatternKind::Doji => 1,
            PatternKind::Hammer | PatternKind::Engulfing => 2,
            PatternKind::MorningStar | PatternKind::EveningStar => 3,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PatternKind {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hammer" => Ok(PatternKind::Hammer),
            "doji" => Ok(PatternKind::Doji),
            "engulfing" => Ok(PatternKind::Engulfing),
            "morning_star" | "morningstar" | "morning-star" => Ok(PatternKind::MorningStar),
            "evening_star" | "eveningstar" | "evening-star" => Ok(PatternKind::EveningStar),
            _ => Err(ScanError::Configuration(format!("Unsupported pattern: {s}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Bars and series
// ---------------------------------------------------------------------------

/// One OHLCV interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Absolute size of the real body.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// High-low range.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// Top of the real body.
    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    /// Bottom of the real body.
    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    /// White candle (close >= open). A flat candle counts as white.
    pub fn is_white(&self) -> bool {
        self.close >= self.open
    }
}

/// Ordered OHLCV history for one symbol and timeframe, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleSeries {
    symbol: Symbol,
    timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl CandleSeries {
    /// Build a series from bars already in oldest-to-newest order.
    ///
    /// Rejects series whose timestamps are not strictly increasing, which
    /// also rules out duplicates.
    pub fn new(symbol: impl Into<Symbol>, timeframe: Timeframe, bars: Vec<Bar>) -> Result<Self, ScanError> {
        let symbol = symbol.into();
        if let Some(pos) = bars.windows(2).position(|w| w[0].timestamp >= w[1].timestamp) {
            return Err(ScanError::DataSource {
                source_name: symbol,
                message: format!(
                    "candle timestamps not strictly increasing at bar {} ({} >= {})",
                    pos + 1,
                    bars[pos].timestamp,
                    bars[pos + 1].timestamp,
                ),
            });
        }
        Ok(Self { symbol, timeframe, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

// ---------------------------------------------------------------------------
// Signals and matches
// ---------------------------------------------------------------------------

/// Directional bias of a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bullish => write!(f, "Bullish"),
            Direction::Bearish => write!(f, "Bearish"),
        }
    }
}

/// Per-bar recognizer output.
///
/// Positive is bullish, negative bearish, zero means no pattern. Values
/// follow the usual candlestick-library scale: 100 for a full match, 80
/// for a weaker variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signal(pub i32);

impl Signal {
    pub const NONE: Signal = Signal(0);
    pub const BULLISH: Signal = Signal(100);
    pub const BEARISH: Signal = Signal(-100);

    pub fn value(self) -> i32 {
        self.0
    }

    /// Whether a pattern is present on the bar.
    pub fn is_match(self) -> bool {
        self.0 != 0
    }

    pub fn direction(self) -> Option<Direction> {
        match self.0.signum() {
            1 => Some(Direction::Bullish),
            -1 => Some(Direction::Bearish),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

/// A symbol whose newest bar carries a non-zero signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub symbol: Symbol,
    pub signal: Signal,
}

impl Match {
    pub fn direction(&self) -> Direction {
        // A Match is only ever built from a non-zero signal.
        self.signal.direction().unwrap_or(Direction::Bullish)
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.direction())
    }
}

// ---------------------------------------------------------------------------
// Scan request / report
// ---------------------------------------------------------------------------

/// Immutable parameters of one scan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub timeframe: Timeframe,
    pub pattern: PatternKind,
}

impl ScanRequest {
    pub fn new(timeframe: Timeframe, pattern: PatternKind) -> Self {
        Self { timeframe, pattern }
    }

    /// Parse user-supplied names. Fails with a configuration error on the
    /// first unknown value; nothing touches the network.
    pub fn parse(timeframe: &str, pattern: &str) -> Result<Self, ScanError> {
        Ok(Self {
            timeframe: timeframe.parse()?,
            pattern: pattern.parse()?,
        })
    }
}

impl fmt::Display for ScanRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.pattern, self.timeframe)
    }
}

/// Outcome of one completed scan run.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub request: ScanRequest,
    /// Matches in symbol-list order.
    pub matches: Vec<Match>,
    /// Symbols in the scan universe.
    pub symbols_total: usize,
    /// Symbols that reached the recognizer.
    pub symbols_evaluated: usize,
    /// Symbols with no data or too few bars.
    pub symbols_skipped: usize,
    /// Symbols whose candle fetch failed.
    pub symbols_failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scan {}: symbols={} evaluated={} skipped={} failed={} matches={}",
            self.request,
            self.symbols_total,
            self.symbols_evaluated,
            self.symbols_skipped,
            self.symbols_failed,
            self.matches.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced by the scanner library.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    /// Network failure, non-2xx response, or an unexpected response shape.
    #[error("Data source error ({source_name}): {message}")]
    DataSource { source_name: String, message: String },

    /// Invalid timeframe, pattern or config value. Raised before any
    /// network activity.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ScanError {
    pub fn data_source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        ScanError::DataSource {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn is_data_source(&self) -> bool {
        matches!(self, ScanError::DataSource { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, ScanError::Configuration(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
