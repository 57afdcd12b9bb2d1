//! Missing-data gaps: classification by length, interpolation of short gaps and the
//! segment/trim helpers shared by the gap-aware filter and spectral estimator.

use crate::runs::{nan_runs, Run};
use biosig_core::num_rs::interp1d;
use core::ops::Range;

pub use biosig_core::num_rs::InterpMethod;

/// Valid samples taken on each side of a gap by curve-fitting methods.
const NEIGHBOURHOOD: usize = 3;

/// NaN runs of one channel split by a length threshold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GapSet {
    /// Gaps no longer than the threshold. These get interpolated.
    pub short: Vec<Run>,
    /// Gaps longer than the threshold. These are preserved as NaN.
    pub long: Vec<Run>,
}

impl GapSet {
    /// Whether the channel has no gap at all.
    pub fn is_empty(&self) -> bool {
        self.short.is_empty() && self.long.is_empty()
    }
}

/// Split NaN runs into short (`len <= max_gap_len`) and long gaps.
///
/// Without a bound every gap is long, i.e. every missing sample is preserved.
pub fn classify_gaps(nan_runs: &[Run], max_gap_len: Option<usize>) -> GapSet {
    let (short, long) = nan_runs
        .iter()
        .copied()
        .partition(|run: &Run| max_gap_len.is_some_and(|max| run.len <= max));
    GapSet { short, long }
}

/// Fill each gap in `gaps` from the valid samples around it.
///
/// Linear and nearest use the two samples bracketing the gap; monotone-cubic and spline use
/// up to three valid samples on each side. A gap touching either end of the channel lacks a
/// bracketing sample and stays NaN, so an all-NaN channel comes back unchanged.
pub fn interpolate(channel: &[f64], gaps: &[Run], method: InterpMethod) -> Vec<f64> {
    let mut out = channel.to_vec();
    let support = if method.uses_neighbourhood() {
        NEIGHBOURHOOD
    } else {
        1
    };

    for gap in gaps {
        let left: Vec<usize> = (0..gap.start)
            .rev()
            .filter(|&i| !channel[i].is_nan())
            .take(support)
            .collect();
        let right: Vec<usize> = (gap.end + 1..channel.len())
            .filter(|&i| !channel[i].is_nan())
            .take(support)
            .collect();
        if left.is_empty() || right.is_empty() {
            tracing::trace!(start = gap.start, len = gap.len, "gap not bracketed, left unfilled");
            continue;
        }

        let knots: Vec<usize> = left.into_iter().rev().chain(right).collect();
        let xs: Vec<f64> = knots.iter().map(|&i| i as f64).collect();
        let ys: Vec<f64> = knots.iter().map(|&i| channel[i]).collect();
        let xq: Vec<f64> = gap.range().map(|i| i as f64).collect();
        match interp1d(&xs, &ys, &xq, method) {
            Ok(filled) => out[gap.range()].copy_from_slice(&filled),
            Err(err) => tracing::debug!(start = gap.start, %err, "gap interpolation skipped"),
        }
    }
    out
}

/// Fill every gap of at most `max_gap_len` samples, leaving longer gaps as NaN.
pub fn fill_gaps(channel: &[f64], max_gap_len: usize, method: InterpMethod) -> Vec<f64> {
    let gaps = classify_gaps(&nan_runs(channel), Some(max_gap_len));
    interpolate(channel, &gaps.short, method)
}

/// Ranges of a channel of length `len` not covered by any of the `long` gaps.
///
/// The ranges are ascending, non-overlapping and non-empty. `long` must be ascending.
pub fn segments(len: usize, long: &[Run]) -> Vec<Range<usize>> {
    let mut out = Vec::with_capacity(long.len() + 1);
    let mut cursor = 0;
    for gap in long {
        if gap.start > cursor {
            out.push(cursor..gap.start);
        }
        cursor = gap.end + 1;
    }
    if cursor < len {
        out.push(cursor..len);
    }
    out
}

/// Range of `x` left after dropping leading and trailing NaN, `None` when all samples are NaN.
pub fn trim_nan(x: &[f64]) -> Option<Range<usize>> {
    let first = x.iter().position(|v| !v.is_nan())?;
    let last = x.iter().rposition(|v| !v.is_nan())?;
    Some(first..last + 1)
}

/// Maximal ranges of `x` without any NaN sample, ascending.
pub fn valid_runs(x: &[f64]) -> Vec<Range<usize>> {
    segments(x.len(), &nan_runs(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const NAN: f64 = f64::NAN;

    #[test]
    fn classification_uses_inclusive_threshold() {
        let x = [1., NAN, 2., NAN, NAN, 3., NAN, NAN, NAN, 4.];
        let gaps = classify_gaps(&nan_runs(&x), Some(2));
        assert_eq!(gaps.short.iter().map(|r| r.len).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(gaps.long.iter().map(|r| r.start).collect::<Vec<_>>(), vec![6]);

        let all_long = classify_gaps(&nan_runs(&x), None);
        assert!(all_long.short.is_empty());
        assert_eq!(all_long.long.len(), 3);
        assert!(classify_gaps(&[], Some(3)).is_empty());
    }

    #[test]
    fn linear_fill_is_exact_on_ramps() {
        let x = [0., 1., NAN, NAN, 4., 5.];
        let y = interpolate(&x, &nan_runs(&x), InterpMethod::Linear);
        assert_eq!(y, vec![0., 1., 2., 3., 4., 5.]);
    }

    #[test]
    fn curve_methods_use_a_neighbourhood() {
        let x: Vec<f64> = (0..12)
            .map(|i| if (5..7).contains(&i) { NAN } else { (i as f64).powi(2) })
            .collect();
        let y = interpolate(&x, &nan_runs(&x), InterpMethod::Pchip);
        // The chord between the brackets gives 27 and 38 on this convex curve.
        assert!(y[5] < 27.0 && y[5] > 16.0);
        assert!(y[6] < 38.0 && y[6] > 25.0);

        let s = interpolate(&x, &nan_runs(&x), InterpMethod::Spline);
        assert_relative_eq!(s[5], 25.0, epsilon = 1.0);
        assert_relative_eq!(s[6], 36.0, epsilon = 1.0);
    }

    #[test]
    fn boundary_gaps_are_left_unfilled() {
        let x = [NAN, NAN, 1., NAN, 3., NAN];
        let y = interpolate(&x, &nan_runs(&x), InterpMethod::Nearest);
        assert!(y[0].is_nan() && y[1].is_nan() && y[5].is_nan());
        assert_eq!(y[3], 3.0);

        let all = [NAN; 4];
        assert!(interpolate(&all, &nan_runs(&all), InterpMethod::Linear)
            .iter()
            .all(|v| v.is_nan()));
    }

    #[test]
    fn bounded_fill_preserves_long_gaps() {
        let x = [1., NAN, 3., NAN, NAN, NAN, 7.];
        let y = fill_gaps(&x, 2, InterpMethod::Linear);
        assert_eq!(y[1], 2.0);
        assert!(y[3..6].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn segments_complement_long_gaps() {
        let x = [NAN, 1., 2., NAN, NAN, 3., NAN];
        let runs = nan_runs(&x);
        assert_eq!(segments(x.len(), &runs), vec![1..3, 5..6]);
        assert_eq!(segments(4, &[]), vec![0..4]);
        assert!(segments(0, &[]).is_empty());
        assert_eq!(valid_runs(&x), vec![1..3, 5..6]);
    }

    #[test]
    fn trimming_drops_boundary_nan_only() {
        assert_eq!(trim_nan(&[NAN, 1., NAN, 2., NAN, NAN]), Some(1..4));
        assert_eq!(trim_nan(&[1., 2.]), Some(0..2));
        assert_eq!(trim_nan(&[NAN, NAN]), None);
        assert_eq!(trim_nan(&[]), None);
    }
}
