//! Three-candle reversal shapes: morning star and evening star.

use super::helpers::{self, AVG_PERIOD};
use super::Recognizer;
use crate::types::{Bar, PatternKind, Signal};

/// How far the third close must reach back into the first body.
const DEFAULT_PENETRATION: f64 = 0.3;

/// Long black candle, a short body gapping below it, then a white candle
/// closing well into the first body.
#[derive(Debug, Clone, Copy)]
pub struct MorningStar {
    pub penetration: f64,
}

impl Default for MorningStar {
    fn default() -> Self {
        Self {
            penetration: DEFAULT_PENETRATION,
        }
    }
}

impl Recognizer for MorningStar {
    fn kind(&self) -> PatternKind {
        PatternKind::MorningStar
    }

    fn signal_at(&self, bars: &[Bar], index: usize) -> Signal {
        let Some((first, second, third)) = triple(bars, index) else {
            return Signal::NONE;
        };

        if first.is_white() || !third.is_white() {
            return Signal::NONE;
        }
        if !star_bodies(bars, index) {
            return Signal::NONE;
        }
        // Real-body gap down from the first to the star.
        if second.body_top() >= first.body_bottom() {
            return Signal::NONE;
        }
        if third.close <= first.close + first.body() * self.penetration {
            return Signal::NONE;
        }

        Signal::BULLISH
    }
}

/// Long white candle, a short body gapping above it, then a black candle
/// closing well into the first body.
#[derive(Debug, Clone, Copy)]
pub struct EveningStar {
    pub penetration: f64,
}

impl Default for EveningStar {
    fn default() -> Self {
        Self {
            penetration: DEFAULT_PENETRATION,
        }
    }
}

impl Recognizer for EveningStar {
    fn kind(&self) -> PatternKind {
        PatternKind::EveningStar
    }

    fn signal_at(&self, bars: &[Bar], index: usize) -> Signal {
        let Some((first, second, third)) = triple(bars, index) else {
            return Signal::NONE;
        };

        if !first.is_white() || third.is_white() {
            return Signal::NONE;
        }
        if !star_bodies(bars, index) {
            return Signal::NONE;
        }
        if second.body_bottom() <= first.body_top() {
            return Signal::NONE;
        }
        if third.close >= first.close - first.body() * self.penetration {
            return Signal::NONE;
        }

        Signal::BEARISH
    }
}

fn triple(bars: &[Bar], index: usize) -> Option<(&Bar, &Bar, &Bar)> {
    if index < 2 {
        return None;
    }
    Some((bars.get(index - 2)?, bars.get(index - 1)?, bars.get(index)?))
}

/// Body-size checks shared by both stars: long first body, short star,
/// third body longer than average. Each is measured against the trailing
/// average at its own position.
fn star_bodies(bars: &[Bar], index: usize) -> bool {
    let first = &bars[index - 2];
    let second = &bars[index - 1];
    let third = &bars[index];

    let avg_first = helpers::trailing_avg_body(bars, index - 2, AVG_PERIOD);
    let avg_second = helpers::trailing_avg_body(bars, index - 1, AVG_PERIOD);
    let avg_third = helpers::trailing_avg_body(bars, index, AVG_PERIOD);

    helpers::is_body_long(first.body(), avg_first, first.range())
        && helpers::is_body_short(second.body(), avg_second, second.range())
        && third.body() > avg_third
}
