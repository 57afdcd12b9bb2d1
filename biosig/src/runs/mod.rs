//! Detection of maximal runs of repeated values along an axis of an n-dimensional array.
//!
//! `0`, `NaN`, `+Inf` and `-Inf` are scanned through independent masks: a NaN never compares
//! equal to itself, so an equality scan alone cannot find NaN runs. Ordinary values are
//! scanned with those four classes masked out.

use biosig_core::{Error, Result};
use ndarray::{ArrayBase, Axis, Data, Dimension};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Class of value a [Run] is made of.
///
/// The declaration order is the order in which classes are concatenated in a [RunTable].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunKind {
    /// Any finite, non-zero value.
    Value,
    /// `0.0` or `-0.0`.
    Zero,
    /// Missing sample.
    Nan,
    /// `+Inf`.
    PosInf,
    /// `-Inf`.
    NegInf,
}

impl RunKind {
    /// Every class, in table order.
    pub const ALL: [RunKind; 5] = [
        RunKind::Value,
        RunKind::Zero,
        RunKind::Nan,
        RunKind::PosInf,
        RunKind::NegInf,
    ];

    /// Classify a single sample.
    pub fn of(v: f64) -> Self {
        if v.is_nan() {
            RunKind::Nan
        } else if v == f64::INFINITY {
            RunKind::PosInf
        } else if v == f64::NEG_INFINITY {
            RunKind::NegInf
        } else if v == 0.0 {
            RunKind::Zero
        } else {
            RunKind::Value
        }
    }
}

/// A maximal contiguous span of one value along the scanned axis.
///
/// `start` and `end` are inclusive, zero-based positions along the axis, and
/// `len == end - start + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Run {
    /// Repeated value. `NaN` for missing-data runs.
    pub value: f64,
    /// Class of `value`.
    pub kind: RunKind,
    /// First index of the run.
    pub start: usize,
    /// Last index of the run.
    pub end: usize,
    /// Number of samples in the run.
    pub len: usize,
    /// Row-major ordinal of the lane (all other axes fixed) the run lives in.
    pub lane: usize,
}

impl Run {
    fn new(value: f64, start: usize, end: usize, lane: usize) -> Self {
        Self {
            value,
            kind: RunKind::of(value),
            start,
            end,
            len: end - start + 1,
            lane,
        }
    }

    /// Index range covered by the run.
    pub fn range(&self) -> core::ops::Range<usize> {
        self.start..self.end + 1
    }

    /// Whether `other` is made of the same value, treating NaN as equal to NaN.
    pub fn same_value(&self, other: f64) -> bool {
        match self.kind {
            RunKind::Nan => other.is_nan(),
            _ => self.value == other,
        }
    }
}

/// Ordered collection of runs found by [find_runs].
///
/// Runs are grouped by [RunKind] in the order `Value, Zero, Nan, PosInf, NegInf`. Inside a
/// group they are ordered by lane and then by start index. Downstream code may rely on this
/// row order; filtering by kind is available through [RunTable::of_kind].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunTable {
    shape: Vec<usize>,
    axis: usize,
    runs: Vec<Run>,
}

impl RunTable {
    fn empty(shape: &[usize], axis: usize) -> Self {
        Self {
            shape: shape.to_vec(),
            axis,
            runs: Vec::new(),
        }
    }

    /// The axis that was scanned.
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Shape of the scanned array.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether no run was found.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// All runs in table order.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Iterate over the runs in table order.
    pub fn iter(&self) -> core::slice::Iter<'_, Run> {
        self.runs.iter()
    }

    /// Runs of one class, in table order.
    pub fn of_kind(&self, kind: RunKind) -> impl Iterator<Item = &Run> + '_ {
        self.runs.iter().filter(move |run| run.kind == kind)
    }

    /// Runs of one value (NaN matches NaN), in table order.
    pub fn of_value(&self, value: f64) -> impl Iterator<Item = &Run> + '_ {
        self.runs.iter().filter(move |run| run.same_value(value))
    }

    /// Missing-data runs.
    pub fn nan_runs(&self) -> impl Iterator<Item = &Run> + '_ {
        self.of_kind(RunKind::Nan)
    }

    /// Full array index of the first element of `run`.
    pub fn position(&self, run: &Run) -> Vec<usize> {
        let mut index = vec![0; self.shape.len()];
        let mut rem = run.lane;
        for ax in (0..self.shape.len()).rev() {
            if ax == self.axis {
                continue;
            }
            index[ax] = rem % self.shape[ax];
            rem /= self.shape[ax];
        }
        if let Some(i) = index.get_mut(self.axis) {
            *i = run.start;
        }
        index
    }

    /// Consume the table, returning the runs in table order.
    pub fn into_runs(self) -> Vec<Run> {
        self.runs
    }
}

impl<'a> IntoIterator for &'a RunTable {
    type Item = &'a Run;
    type IntoIter = core::slice::Iter<'a, Run>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.iter()
    }
}

/// Element types [find_runs] accepts. Values are coerced to `f64`; `bool` becomes `0.0`/`1.0`.
pub trait RunValue: Copy {
    /// Coerce into the scanned representation.
    fn as_run_value(self) -> f64;
}

macro_rules! run_value_as_cast {
    ($($t:ty),*) => {
        $(
            impl RunValue for $t {
                #[inline]
                fn as_run_value(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

run_value_as_cast!(f64, f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl RunValue for bool {
    #[inline]
    fn as_run_value(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }
}

/// Append to `out` the maximal runs of class `kind` found in one lane.
///
/// Positions not of class `kind` act as run breakers. For [RunKind::Value] a run also breaks
/// when the value changes.
fn scan_lane<I>(lane: I, kind: RunKind, lane_idx: usize, out: &mut Vec<Run>)
where
    I: IntoIterator<Item = f64>,
{
    // (start, last index, value) of the run being extended.
    let mut open: Option<(usize, usize, f64)> = None;
    for (i, v) in lane.into_iter().enumerate() {
        let member = RunKind::of(v) == kind;
        match open {
            Some((start, _, value)) if member && (kind != RunKind::Value || v == value) => {
                open = Some((start, i, value));
            }
            _ => {
                if let Some((start, end, value)) = open.take() {
                    out.push(Run::new(value, start, end, lane_idx));
                }
                if member {
                    open = Some((i, i, v));
                }
            }
        }
    }
    if let Some((start, end, value)) = open {
        out.push(Run::new(value, start, end, lane_idx));
    }
}

/// Runs of every class in a 1D channel, in [RunTable] order.
///
/// Unlike [find_runs], a channel of length one still yields its single run.
pub fn scan_runs(x: &[f64]) -> Vec<Run> {
    let mut runs = Vec::new();
    for kind in RunKind::ALL {
        scan_lane(x.iter().copied(), kind, 0, &mut runs);
    }
    runs
}

/// Missing-data runs of a 1D channel, ascending.
pub fn nan_runs(x: &[f64]) -> Vec<Run> {
    let mut runs = Vec::new();
    scan_lane(x.iter().copied(), RunKind::Nan, 0, &mut runs);
    runs
}

/// Find maximal runs of repeated values along one axis of an array.
///
/// ## Parameters
/// * `x` : array of any rank; elements are coerced with [RunValue].
/// * `axis` : zero-based axis to scan. Defaults to the first axis longer than one.
///
/// ## Returns
/// A [RunTable]. Scalars, empty arrays and axes shorter than two samples give an empty table.
/// Single-sample runs are reported, so per value and lane the run lengths add up to the
/// number of occurrences.
///
/// ## Errors
/// [Error::InvalidArg] when `axis` is out of range.
///
/// # Examples
/// ```
/// use biosig::runs::find_runs;
/// use ndarray::array;
///
/// let x = array![1., 1., 1., 2., 3., 3., 4., 5., 5., 5., 5., 6., 7., 7., 8.];
/// let table = find_runs(&x, None).unwrap();
/// let fives = table.of_value(5.).next().unwrap();
/// assert_eq!((fives.start, fives.end, fives.len), (7, 10, 4));
/// ```
pub fn find_runs<A, S, D>(x: &ArrayBase<S, D>, axis: Option<usize>) -> Result<RunTable>
where
    A: RunValue,
    S: Data<Elem = A>,
    D: Dimension,
{
    let shape = x.shape();
    if shape.is_empty() {
        return Ok(RunTable::empty(shape, 0));
    }

    let axis = match axis {
        Some(ax) if ax >= shape.len() => {
            return Err(Error::invalid_arg(
                "axis",
                format!("axis {ax} is out of range for a {}-d array.", shape.len()),
            ));
        }
        Some(ax) => ax,
        None => match shape.iter().position(|&n| n > 1) {
            Some(ax) => ax,
            None => return Ok(RunTable::empty(shape, 0)),
        },
    };
    if x.is_empty() || shape[axis] < 2 {
        return Ok(RunTable::empty(shape, axis));
    }

    let mut table = RunTable::empty(shape, axis);
    for kind in RunKind::ALL {
        for (lane_idx, lane) in x.lanes(Axis(axis)).into_iter().enumerate() {
            scan_lane(
                lane.iter().map(|&v| v.as_run_value()),
                kind,
                lane_idx,
                &mut table.runs,
            );
        }
    }
    tracing::trace!(axis, runs = table.runs.len(), "found runs");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array, Array3, IxDyn};

    #[test]
    fn finds_runs_of_ordinary_values() {
        let x = array![1., 1., 1., 2., 3., 3., 4., 5., 5., 5., 5., 6., 7., 7., 8.];
        let table = find_runs(&x, Some(0)).unwrap();
        let ones = table.of_value(1.).collect::<Vec<_>>();
        assert_eq!(ones.len(), 1);
        assert_eq!((ones[0].start, ones[0].end, ones[0].len), (0, 2, 3));
        let fives = table.of_value(5.).collect::<Vec<_>>();
        assert_eq!((fives[0].start, fives[0].end, fives[0].len), (7, 10, 4));
        assert_eq!(table.iter().map(|r| r.len).sum::<usize>(), x.len());
        assert!(table.iter().all(|r| r.kind == RunKind::Value));
    }

    #[test]
    fn special_values_are_grouped_after_ordinary_values() {
        let nan = f64::NAN;
        let inf = f64::INFINITY;
        let x = array![0., 0., nan, nan, nan, 2., 2., -inf, inf, inf, 0., nan];
        let table = find_runs(&x, None).unwrap();
        let kinds = table.iter().map(|r| r.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                RunKind::Value,
                RunKind::Zero,
                RunKind::Zero,
                RunKind::Nan,
                RunKind::Nan,
                RunKind::PosInf,
                RunKind::NegInf,
            ]
        );
        let nans = table.nan_runs().map(|r| (r.start, r.end)).collect::<Vec<_>>();
        assert_eq!(nans, vec![(2, 4), (11, 11)]);
        assert!(table.of_value(nan).all(|r| r.value.is_nan()));
    }

    #[test]
    fn adjacent_different_values_do_not_merge() {
        let x = array![3., 3., 4., 4., 4., 3.];
        let table = find_runs(&x, None).unwrap();
        let spans = table.iter().map(|r| (r.value, r.len)).collect::<Vec<_>>();
        assert_eq!(spans, vec![(3., 2), (4., 3), (3., 1)]);
    }

    #[test]
    fn booleans_are_coerced() {
        let x = array![true, true, false, false, false, true];
        let table = find_runs(&x, None).unwrap();
        let zeros = table.of_kind(RunKind::Zero).collect::<Vec<_>>();
        assert_eq!(zeros.len(), 1);
        assert_eq!((zeros[0].start, zeros[0].len), (2, 3));
        assert_eq!(table.of_value(1.).count(), 2);
    }

    #[test]
    fn degenerate_inputs_give_empty_tables() {
        let scalar = Array::from_elem(IxDyn(&[]), 1.0);
        assert!(find_runs(&scalar, None).unwrap().is_empty());

        let empty = Array::<f64, _>::zeros((0, 3));
        assert!(find_runs(&empty, Some(1)).unwrap().is_empty());

        let single = array![[4.0], [4.0]];
        assert!(find_runs(&single, Some(1)).unwrap().is_empty());

        let ones = array![[7.0]];
        assert!(find_runs(&ones, None).unwrap().is_empty());
    }

    #[test]
    fn axis_out_of_range_is_rejected() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let err = find_runs(&x, Some(2)).unwrap_err();
        assert!(matches!(err, Error::InvalidArg { ref arg, .. } if arg == "axis"));
    }

    #[test]
    fn default_axis_skips_singleton_axes() {
        let x = array![[1.0, 1.0, 2.0]];
        let table = find_runs(&x, None).unwrap();
        assert_eq!(table.axis(), 1);
        assert_eq!(table.runs()[0].len, 2);
    }

    #[test]
    fn scans_along_inner_axes_of_3d_arrays() {
        // Lanes along axis 1 of a (2, 3, 2) array.
        let mut x = Array3::<f64>::zeros((2, 3, 2));
        x[[0, 0, 1]] = 5.0;
        x[[0, 1, 1]] = 5.0;
        x[[1, 1, 0]] = f64::NAN;
        x[[1, 2, 0]] = f64::NAN;
        let table = find_runs(&x, Some(1)).unwrap();

        let fives = table.of_value(5.0).collect::<Vec<_>>();
        assert_eq!(fives.len(), 1);
        assert_eq!((fives[0].start, fives[0].end, fives[0].len), (0, 1, 2));
        assert_eq!(table.position(fives[0]), vec![0, 0, 1]);

        let gaps = table.nan_runs().collect::<Vec<_>>();
        assert_eq!(gaps.len(), 1);
        assert_eq!(table.position(gaps[0]), vec![1, 1, 0]);
        assert_eq!(gaps[0].len, 2);
    }

    #[test]
    fn one_dimensional_helpers_handle_single_samples() {
        assert_eq!(nan_runs(&[f64::NAN]).len(), 1);
        assert_eq!(scan_runs(&[2.0]).len(), 1);
        assert!(nan_runs(&[]).is_empty());
        let gaps = nan_runs(&[1.0, f64::NAN, f64::NAN, 2.0, f64::NAN]);
        let spans = gaps.iter().map(|r| (r.start, r.len)).collect::<Vec<_>>();
        assert_eq!(spans, vec![(1, 2), (4, 1)]);
    }
}
