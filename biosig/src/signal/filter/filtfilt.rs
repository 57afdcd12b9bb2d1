use super::{lfilter_zi, FilterSpec};
use biosig_core::{Error, Result};

/// Odd extension of `x` by `n` samples at each end.
///
/// The left extension is `2 x[0] - x[n..=1]` and the right one mirrors it around the last
/// sample. `n` must be smaller than `x.len()`.
pub(crate) fn odd_ext(x: &[f64], n: usize) -> Vec<f64> {
    if n == 0 || x.is_empty() {
        return x.to_vec();
    }
    let first = x[0];
    let last = x[x.len() - 1];
    let mut ext = Vec::with_capacity(x.len() + 2 * n);
    ext.extend((1..=n).rev().map(|i| 2.0 * first - x[i]));
    ext.extend_from_slice(x);
    ext.extend((1..=n).map(|i| 2.0 * last - x[x.len() - 1 - i]));
    ext
}

/// Forward-backward pass with precomputed steady-state conditions `zi`.
///
/// `padlen < x.len()` must hold unless `x` is empty.
pub(crate) fn filtfilt_with_zi(spec: &FilterSpec, zi: &[f64], x: &[f64], padlen: usize) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    let ext = odd_ext(x, padlen);

    let mut z: Vec<f64> = zi.iter().map(|z| z * ext[0]).collect();
    let mut y = spec.run_with_state(&ext, &mut z);
    y.reverse();

    let mut z: Vec<f64> = zi.iter().map(|z| z * y[0]).collect();
    let mut y = spec.run_with_state(&y, &mut z);
    y.reverse();

    y.drain(..padlen);
    y.truncate(x.len());
    y
}

/// Apply a digital filter forward and backward to a signal.
///
/// After `scipy.signal.filtfilt` with odd padding: the signal is extended by `padlen`
/// samples at both ends, filtered forward from `lfilter_zi * x[0]`, then filtered backward
/// from `lfilter_zi * y[-1]`. The result has zero phase and twice the order of the filter.
///
/// ## Parameters
/// * `spec` : Validated filter coefficients.
/// * `x` : The input signal.
/// * `padlen` : Number of samples to extend `x` by at each end. Defaults to
///   `3 * max(len(a), len(b))`. Must be smaller than `x.len()`.
///
/// # Examples
/// ```
/// use biosig::signal::filter::{filtfilt, FilterSpec};
///
/// let spec = FilterSpec::fir(vec![0.25, 0.5, 0.25]).unwrap();
/// let x = vec![2.0; 16];
/// let y = filtfilt(&spec, &x, None).unwrap();
/// assert!(y.iter().all(|v| (v - 2.0).abs() < 1e-12));
/// ```
pub fn filtfilt(spec: &FilterSpec, x: &[f64], padlen: Option<usize>) -> Result<Vec<f64>> {
    let padlen = padlen.unwrap_or(3 * (spec.order() + 1));
    if x.is_empty() {
        return Ok(Vec::new());
    }
    if padlen >= x.len() {
        return Err(Error::invalid_arg(
            "x",
            format!(
                "the length of the input vector x must be greater than padlen, which is {padlen}."
            ),
        ));
    }
    let zi = lfilter_zi(spec)?;
    Ok(filtfilt_with_zi(spec, &zi, x, padlen))
}
