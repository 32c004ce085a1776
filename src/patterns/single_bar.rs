//! Single-candle shapes: hammer and doji.

use super::helpers::{self, AVG_PERIOD, NEAR_PERIOD};
use super::Recognizer;
use crate::types::{Bar, PatternKind, Signal};

/// Small body near the top of the range with a long lower shadow and
/// almost no upper shadow, printed at or below the prior bar's low.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hammer;

impl Recognizer for Hammer {
    fn kind(&self) -> PatternKind {
        PatternKind::Hammer
    }

    fn signal_at(&self, bars: &[Bar], index: usize) -> Signal {
        if index < 1 || index >= bars.len() {
            return Signal::NONE;
        }
        let bar = &bars[index];
        let prev = &bars[index - 1];

        let body = bar.body();
        let range = bar.range();
        let avg_body = helpers::trailing_avg_body(bars, index, AVG_PERIOD);
        let avg_range = helpers::trailing_avg_range(bars, index, AVG_PERIOD);

        if !helpers::is_body_short(body, avg_body, range) {
            return Signal::NONE;
        }
        if !helpers::is_shadow_long(bar.lower_shadow(), body) {
            return Signal::NONE;
        }
        if !helpers::is_shadow_very_short(bar.upper_shadow(), avg_range, range) {
            return Signal::NONE;
        }

        // Body sits at or below the previous low, within "near" distance.
        let near = helpers::trailing_avg_range(bars, index - 1, NEAR_PERIOD) * helpers::NEAR_FACTOR;
        if bar.body_bottom() > prev.low + near {
            return Signal::NONE;
        }

        Signal::BULLISH
    }
}

/// Open and close (almost) equal. Directionless in shape; reported on the
/// positive side of the scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct Doji;

impl Recognizer for Doji {
    fn kind(&self) -> PatternKind {
        PatternKind::Doji
    }

    fn signal_at(&self, bars: &[Bar], index: usize) -> Signal {
        let Some(bar) = bars.get(index) else {
            return Signal::NONE;
        };
        let avg_range = helpers::trailing_avg_range(bars, index, AVG_PERIOD);
        if helpers::is_doji(bar.body(), avg_range, bar.range()) {
            Signal::BULLISH
        } else {
            Signal::NONE
        }
    }
}
