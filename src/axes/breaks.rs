//! Tick position algorithms
//!
//! Automatic ticks use "nice number" breaks for linear axes and decade breaks for
//! log axes; explicit `[min, max, step]` ranges are generated inclusively.

use crate::canvas::axis::SYMLOG_LINTHRESH;
use crate::config::ScaleKind;

/// Default number of breaks
pub const DEFAULT_BREAK_COUNT: usize = 5;

/// Tolerance, in steps, for including `max` in a range
const RANGE_EPSILON: f64 = 1e-9;

/// Calculate pretty breaks using the "nice numbers" algorithm.
///
/// Steps are 1, 2, 5 or 10 times a power of ten; the result covers `[min, max]`
/// and may extend one step past either end.
pub fn pretty_breaks(min: f64, max: f64, n: usize) -> Vec<f64> {
    if n == 0 || min >= max || !min.is_finite() || !max.is_finite() {
        return vec![];
    }

    let range = max - min;
    let rough_step = range / (n as f64);

    let magnitude = 10f64.powf(rough_step.log10().floor());
    let residual = rough_step / magnitude;

    let nice_step = if residual <= 1.0 {
        1.0 * magnitude
    } else if residual <= 2.0 {
        2.0 * magnitude
    } else if residual <= 5.0 {
        5.0 * magnitude
    } else {
        10.0 * magnitude
    };

    let first = (min / nice_step).floor() as i64;
    let last = (max / nice_step).ceil() as i64;
    (first..=last).map(|i| i as f64 * nice_step).collect()
}

/// Inclusive `[min, max]` range with spacing `step`.
///
/// `max` is kept even when accumulated floating point error would place it a
/// hair beyond the last step.
pub fn range_breaks(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || max < min {
        return vec![];
    }
    let count = ((max - min) / step + RANGE_EPSILON).floor() as usize;
    (0..=count).map(|i| min + step * i as f64).collect()
}

/// Keep only breaks inside `[min, max]`, with a small relative tolerance.
pub fn filter_breaks_to_range(breaks: &[f64], min: f64, max: f64) -> Vec<f64> {
    breaks_in_range(breaks, min, max)
        .into_iter()
        .map(|(_, v)| v)
        .collect()
}

/// Breaks inside `[min, max]`, each paired with its index in `breaks`.
pub fn breaks_in_range(breaks: &[f64], min: f64, max: f64) -> Vec<(usize, f64)> {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let slack = (hi - lo).abs() * 1e-9;
    breaks
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| *v >= lo - slack && *v <= hi + slack)
        .collect()
}

/// Powers of ten inside `[min, max]`; the non-positive part of the interval is ignored.
pub fn decade_breaks(min: f64, max: f64) -> Vec<f64> {
    if !(max > 0.0) || min >= max {
        return vec![];
    }
    let lo = min.max(f64::MIN_POSITIVE);
    let first = lo.log10().floor() as i32;
    let last = max.log10().ceil() as i32;
    (first..=last)
        .map(|e| 10f64.powi(e))
        .filter(|&v| v >= lo * (1.0 - 1e-12) && v <= max * (1.0 + 1e-12))
        .collect()
}

/// 1, 2 and 5 times each power of ten inside `[min, max]`.
///
/// Used when the view spans less than two decades.
pub fn subdecade_breaks(min: f64, max: f64) -> Vec<f64> {
    if !(max > 0.0) || min >= max {
        return vec![];
    }
    let lo = min.max(f64::MIN_POSITIVE);
    let first = lo.log10().floor() as i32;
    let last = max.log10().ceil() as i32;
    (first..=last)
        .flat_map(|e| [1.0, 2.0, 5.0].map(|m| m * 10f64.powi(e)))
        .filter(|&v| v >= lo * (1.0 - 1e-12) && v <= max * (1.0 + 1e-12))
        .collect()
}

/// Symlog breaks: zero when in view, plus decades from the linear threshold
/// outward on each side.
pub fn symlog_breaks(min: f64, max: f64, linthresh: f64) -> Vec<f64> {
    if min >= max {
        return vec![];
    }
    let negative: Vec<f64> = if min < 0.0 {
        decade_breaks((-max).max(linthresh), -min)
            .into_iter()
            .rev()
            .map(|v| -v)
            .collect()
    } else {
        vec![]
    };
    let zero = (min <= 0.0 && max >= 0.0).then_some(0.0);
    let positive = if max > 0.0 {
        decade_breaks(min.max(linthresh), max)
    } else {
        vec![]
    };
    negative.into_iter().chain(zero).chain(positive).collect()
}

/// Automatic tick positions for a view interval on the given scale.
pub fn auto_breaks(scale: ScaleKind, min: f64, max: f64) -> Vec<f64> {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let breaks = match scale {
        ScaleKind::Linear => pretty_breaks(lo, hi, DEFAULT_BREAK_COUNT),
        ScaleKind::Log => {
            let decades = decade_breaks(lo, hi);
            if decades.len() >= 2 {
                decades
            } else {
                subdecade_breaks(lo, hi)
            }
        }
        ScaleKind::Symlog => symlog_breaks(lo, hi, SYMLOG_LINTHRESH),
    };
    filter_breaks_to_range(&breaks, lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_breaks_basic() {
        let breaks = pretty_breaks(0.0, 100.0, 5);
        assert_eq!(breaks, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
    }

    #[test]
    fn test_pretty_breaks_cover_range() {
        let breaks = pretty_breaks(0.13, 0.87, 5);
        assert!(breaks[0] <= 0.13);
        assert!(*breaks.last().unwrap() >= 0.87);
    }

    #[test]
    fn test_pretty_breaks_degenerate() {
        assert!(pretty_breaks(0.0, 100.0, 0).is_empty());
        assert!(pretty_breaks(50.0, 50.0, 5).is_empty());
        assert!(pretty_breaks(f64::NAN, 1.0, 5).is_empty());
    }

    #[test]
    fn test_range_breaks_inclusive() {
        assert_eq!(range_breaks(0.0, 1.0, 0.25), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_range_breaks_float_drift() {
        // 0.1 steps do not sum exactly to 1.0
        let breaks = range_breaks(0.0, 1.0, 0.1);
        assert_eq!(breaks.len(), 11);
        assert!((breaks[10] - 1.0).abs() < 1e-12);

        let breaks = range_breaks(0.0, 0.3, 0.1);
        assert_eq!(breaks.len(), 4);
    }

    #[test]
    fn test_range_breaks_invalid() {
        assert!(range_breaks(0.0, 1.0, 0.0).is_empty());
        assert!(range_breaks(0.0, 1.0, -0.5).is_empty());
        assert!(range_breaks(2.0, 1.0, 0.5).is_empty());
    }

    #[test]
    fn test_filter_breaks_to_range() {
        let breaks = [0.0, 25.0, 50.0, 75.0, 100.0];
        assert_eq!(filter_breaks_to_range(&breaks, 0.5, 99.5), vec![25.0, 50.0, 75.0]);
        assert_eq!(filter_breaks_to_range(&breaks, 100.0, 0.0).len(), 5);
    }

    #[test]
    fn test_breaks_in_range_keep_source_index() {
        let breaks = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(breaks_in_range(&breaks, 0.5, 3.5), vec![(1, 1.0), (2, 2.0), (3, 3.0)]);
    }

    #[test]
    fn test_decade_breaks() {
        assert_eq!(decade_breaks(1.0, 10000.0), vec![1.0, 10.0, 100.0, 1000.0, 10000.0]);
        assert_eq!(decade_breaks(0.5, 50.0), vec![1.0, 10.0]);
        assert!(decade_breaks(-5.0, -1.0).is_empty());
    }

    #[test]
    fn test_subdecade_breaks() {
        assert_eq!(subdecade_breaks(1.0, 9.0), vec![1.0, 2.0, 5.0]);
        assert_eq!(subdecade_breaks(3.0, 30.0), vec![5.0, 10.0, 20.0]);
    }

    #[test]
    fn test_symlog_breaks_span_zero() {
        assert_eq!(
            symlog_breaks(-100.0, 100.0, 1.0),
            vec![-100.0, -10.0, -1.0, 0.0, 1.0, 10.0, 100.0]
        );
        assert_eq!(symlog_breaks(0.5, 20.0, 1.0), vec![1.0, 10.0]);
    }

    #[test]
    fn test_auto_breaks_stay_in_view() {
        let breaks = auto_breaks(ScaleKind::Linear, -0.05, 1.05);
        assert_eq!(breaks.first(), Some(&0.0));
        assert!((breaks.last().unwrap() - 1.0).abs() < 1e-12);

        let breaks = auto_breaks(ScaleKind::Log, 0.5, 2000.0);
        assert_eq!(breaks, vec![1.0, 10.0, 100.0, 1000.0]);
    }
}
