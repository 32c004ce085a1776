//! Shared thresholds and candle comparisons for the recognizers.
//!
//! Thresholds are expressed relative to trailing averages of the bars
//! before the one being classified, the way the classic candlestick
//! libraries do it. When an average is zero (flat history) the checks
//! fall back to ratios of the bar's own range.

use crate::types::Bar;

/// Trailing window for body and range averages.
pub const AVG_PERIOD: usize = 10;
/// Trailing window for the "near" distance used by the hammer.
pub const NEAR_PERIOD: usize = 5;

/// Doji: body <= avg range * DOJI_FACTOR
pub const DOJI_FACTOR: f64 = 0.1;
/// Short body: body < avg body * BODY_SHORT_FACTOR
pub const BODY_SHORT_FACTOR: f64 = 1.0;
/// Long body: body > avg body * BODY_LONG_FACTOR
pub const BODY_LONG_FACTOR: f64 = 1.0;
/// Very short shadow: shadow < avg range * SHADOW_VERYSHORT_FACTOR
pub const SHADOW_VERYSHORT_FACTOR: f64 = 0.1;
/// Near: distance <= avg range * NEAR_FACTOR
pub const NEAR_FACTOR: f64 = 0.2;

// Ratio fallbacks when the trailing average is zero.
const DOJI_RATIO: f64 = 0.1;
const BODY_SHORT_RATIO: f64 = 0.3;
const BODY_LONG_RATIO: f64 = 0.7;
const SHADOW_SHORT_RATIO: f64 = 0.1;

#[inline]
pub fn is_doji(body: f64, avg_range: f64, range: f64) -> bool {
    // A zero body is a doji under any threshold.
    if body <= 0.0 {
        return true;
    }
    if avg_range > 0.0 {
        body <= avg_range * DOJI_FACTOR
    } else {
        range > 0.0 && body / range <= DOJI_RATIO
    }
}

#[inline]
pub fn is_body_short(body: f64, avg_body: f64, range: f64) -> bool {
    if avg_body > 0.0 {
        body < avg_body * BODY_SHORT_FACTOR
    } else {
        range > 0.0 && body / range <= BODY_SHORT_RATIO
    }
}

#[inline]
pub fn is_body_long(body: f64, avg_body: f64, range: f64) -> bool {
    if avg_body > 0.0 {
        body > avg_body * BODY_LONG_FACTOR
    } else {
        range > 0.0 && body / range >= BODY_LONG_RATIO
    }
}

/// Long shadow: longer than the bar's own body.
#[inline]
pub fn is_shadow_long(shadow: f64, body: f64) -> bool {
    shadow > body
}

#[inline]
pub fn is_shadow_very_short(shadow: f64, avg_range: f64, range: f64) -> bool {
    if avg_range > 0.0 {
        shadow < avg_range * SHADOW_VERYSHORT_FACTOR
    } else {
        range > 0.0 && shadow / range <= SHADOW_SHORT_RATIO
    }
}

/// Average real body over up to `period` bars before `at`.
/// Bar 0 has no history and is measured against itself.
pub fn trailing_avg_body(bars: &[Bar], at: usize, period: usize) -> f64 {
    trailing_avg(bars, at, period, Bar::body)
}

/// Average high-low range over up to `period` bars before `at`.
pub fn trailing_avg_range(bars: &[Bar], at: usize, period: usize) -> f64 {
    trailing_avg(bars, at, period, Bar::range)
}

fn trailing_avg(bars: &[Bar], at: usize, period: usize, measure: fn(&Bar) -> f64) -> f64 {
    if bars.is_empty() {
        return 0.0;
    }
    if at == 0 || period == 0 {
        return measure(&bars[at.min(bars.len() - 1)]);
    }
    let end = at.min(bars.len());
    let window = &bars[end.saturating_sub(period)..end];
    window.iter().map(measure).sum::<f64>() / window.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.timestamp_opt(0, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_doji_zero_body() {
        assert!(is_doji(0.0, 5.0, 5.0));
    }

    #[test]
    fn test_doji_fallback_ratio() {
        assert!(is_doji(0.05, 0.0, 1.0));
        assert!(!is_doji(0.5, 0.0, 1.0));
    }

    #[test]
    fn test_body_short_and_long() {
        assert!(is_body_short(0.5, 1.0, 2.0));
        assert!(!is_body_short(1.0, 1.0, 2.0));
        assert!(is_body_long(1.5, 1.0, 2.0));
        assert!(!is_body_long(1.0, 1.0, 2.0));
    }

    #[test]
    fn test_trailing_avg_excludes_current_bar() {
        let bars = vec![
            bar(1.0, 3.0, 0.0, 2.0), // body 1, range 3
            bar(1.0, 4.0, 0.0, 4.0), // body 3, range 4
            bar(1.0, 9.0, 0.0, 9.0), // current, ignored
        ];
        assert_eq!(trailing_avg_body(&bars, 2, 10), 2.0);
        assert_eq!(trailing_avg_range(&bars, 2, 10), 3.5);
        assert_eq!(trailing_avg_body(&bars, 2, 1), 3.0);
    }

    #[test]
    fn test_trailing_avg_first_bar_uses_itself() {
        let bars = vec![bar(1.0, 3.0, 0.0, 2.0)];
        assert_eq!(trailing_avg_body(&bars, 0, 10), 1.0);
        assert_eq!(trailing_avg_range(&[], 0, 10), 0.0);
    }
}
