//! Candlestick pattern recognition.
//!
//! Each supported [`PatternKind`] has one [`Recognizer`] that classifies a
//! single bar given the history before it. [`PatternDetector`] evaluates
//! the recognizer over a whole series and reports the newest bar's
//! signal. Adding a pattern means adding a `PatternKind` variant and a
//! recognizer; the scan engine does not change.

pub mod helpers;
pub mod single_bar;
pub mod three_bar;
pub mod two_bar;

use crate::types::{Bar, CandleSeries, PatternKind, Signal};

pub use single_bar::{Doji, Hammer};
pub use three_bar::{EveningStar, MorningStar};
pub use two_bar::Engulfing;

/// A pure per-bar pattern classifier over open/high/low/close.
pub trait Recognizer: Send + Sync {
    /// The pattern this recognizer detects.
    fn kind(&self) -> PatternKind;

    /// Signal for `bars[index]`, using earlier bars as context.
    /// Out-of-range indices and bars without enough history yield zero.
    fn signal_at(&self, bars: &[Bar], index: usize) -> Signal;

    /// Signal for every bar in order.
    fn evaluate(&self, bars: &[Bar]) -> Vec<Signal> {
        (0..bars.len()).map(|i| self.signal_at(bars, i)).collect()
    }
}

/// Dispatches a [`PatternKind`] to its recognizer.
#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    hammer: Hammer,
    doji: Doji,
    engulfing: Engulfing,
    morning_star: MorningStar,
    evening_star: EveningStar,
}

impl PatternDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recognizer(&self, kind: PatternKind) -> &dyn Recognizer {
        match kind {
            PatternKind::Hammer => &self.hammer,
            PatternKind::Doji => &self.doji,
            PatternKind::Engulfing => &self.engulfing,
            PatternKind::MorningStar => &self.morning_star,
            PatternKind::EveningStar => &self.evening_star,
        }
    }

    /// Per-bar signals for the whole series, oldest first.
    pub fn evaluate(&self, series: &CandleSeries, kind: PatternKind) -> Vec<Signal> {
        self.recognizer(kind).evaluate(series.bars())
    }

    /// Signal on the most recent bar. Earlier bars only provide context.
    pub fn detect(&self, series: &CandleSeries, kind: PatternKind) -> Signal {
        let bars = series.bars();
        if bars.len() < kind.bars_spanned() {
            return Signal::NONE;
        }
        self.recognizer(kind).signal_at(bars, bars.len() - 1)
    }
}
