//! Two-candle shapes: engulfing.

use super::Recognizer;
use crate::types::{Bar, PatternKind, Signal};

/// Weaker engulfing where one end of the bodies coincides.
const PARTIAL_ENGULF: i32 = 80;

/// A body of the opposite colour wraps the previous body.
///
/// White engulfing black is bullish, black engulfing white is bearish.
/// Strict engulfing on both ends scores ±100, a shared end scores ±80.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engulfing;

impl Recognizer for Engulfing {
    fn kind(&self) -> PatternKind {
        PatternKind::Engulfing
    }

    fn signal_at(&self, bars: &[Bar], index: usize) -> Signal {
        if index < 1 || index >= bars.len() {
            return Signal::NONE;
        }
        let prev = &bars[index - 1];
        let curr = &bars[index];
        let strict = curr.open != prev.close && curr.close != prev.open;
        let score = if strict { 100 } else { PARTIAL_ENGULF };

        if curr.is_white() && !prev.is_white() {
            // At most one end may be equal.
            let wraps = (curr.close >= prev.open && curr.open < prev.close)
                || (curr.close > prev.open && curr.open <= prev.close);
            if wraps {
                return Signal(score);
            }
        }

        if !curr.is_white() && prev.is_white() {
            let wraps = (curr.open >= prev.close && curr.close < prev.open)
                || (curr.open > prev.close && curr.close <= prev.open);
            if wraps {
                return Signal(-score);
            }
        }

        Signal::NONE
    }
}
