use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interpolation method for [interp1d].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InterpMethod {
    /// Value of the closest sample point. Ties resolve to the upper sample.
    Nearest,
    /// Piecewise linear interpolation.
    #[default]
    Linear,
    /// Shape-preserving piecewise cubic Hermite interpolation (Fritsch-Carlson slopes).
    /// Never overshoots the data between two samples.
    Pchip,
    /// Natural cubic spline (zero second derivative at both end points).
    Spline,
}

impl InterpMethod {
    /// Whether the method fits a curve through more than the two bracketing samples.
    pub fn uses_neighbourhood(&self) -> bool {
        matches!(self, InterpMethod::Pchip | InterpMethod::Spline)
    }
}

/// One-dimensional interpolation of sparse `(x, y)` samples at query points `xq`.
///
/// Best effort parallel behaviour with scipy's `interp1d(..., bounds_error=False)`.
///
/// # Parameters
/// * `x` : (N,) strictly increasing sample positions, `N >= 2`.
/// * `y` : (N,) sample values.
/// * `xq` : query positions.
/// * `method` : see [InterpMethod].
///
/// # Returns
/// One value per query. Queries outside `[x[0], x[N-1]]` and NaN queries yield NaN;
/// no extrapolation is performed.
///
/// # Errors
/// [Error::InvalidArg] when lengths differ, fewer than two samples are given, or `x` is not
/// strictly increasing.
///
/// # Examples
/// ```
/// use biosig_core::num_rs::{interp1d, InterpMethod};
///
/// let x = [0., 1., 3.];
/// let y = [0., 2., 6.];
/// let yq = interp1d(&x, &y, &[0.5, 2.0, 4.0], InterpMethod::Linear).unwrap();
/// assert_eq!(yq[0], 1.0);
/// assert_eq!(yq[1], 4.0);
/// assert!(yq[2].is_nan());
/// ```
pub fn interp1d(x: &[f64], y: &[f64], xq: &[f64], method: InterpMethod) -> Result<Vec<f64>> {
    if x.len() != y.len() {
        return Err(Error::invalid_arg(
            "y",
            "sample positions and values must have the same length.",
        ));
    }
    if x.len() < 2 {
        return Err(Error::invalid_arg(
            "x",
            "at least two sample points are required.",
        ));
    }
    if x.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(Error::invalid_arg("x", "must be strictly increasing."));
    }

    let yq = match method {
        InterpMethod::Nearest => xq.iter().map(|&q| eval_nearest(x, y, q)).collect(),
        InterpMethod::Linear => xq.iter().map(|&q| eval_linear(x, y, q)).collect(),
        InterpMethod::Pchip => {
            let d = pchip_slopes(x, y);
            xq.iter().map(|&q| eval_hermite(x, y, &d, q)).collect()
        }
        InterpMethod::Spline => {
            let coeffs = NaturalSpline::fit(x, y);
            xq.iter().map(|&q| coeffs.eval(x, y, q)).collect()
        }
    };
    Ok(yq)
}

/// Index `i` of the interval `[x[i], x[i + 1]]` containing `q`, or `None` when out of range.
#[inline]
fn interval(x: &[f64], q: f64) -> Option<usize> {
    let n = x.len();
    if q.is_nan() || q < x[0] || q > x[n - 1] {
        return None;
    }
    let i = x.partition_point(|&v| v <= q).saturating_sub(1);
    Some(i.min(n - 2))
}

fn eval_nearest(x: &[f64], y: &[f64], q: f64) -> f64 {
    let Some(i) = interval(x, q) else {
        return f64::NAN;
    };
    if q - x[i] < x[i + 1] - q {
        y[i]
    } else {
        y[i + 1]
    }
}

fn eval_linear(x: &[f64], y: &[f64], q: f64) -> f64 {
    let Some(i) = interval(x, q) else {
        return f64::NAN;
    };
    let t = (q - x[i]) / (x[i + 1] - x[i]);
    y[i] + t * (y[i + 1] - y[i])
}

/// Derivative estimates at every sample for the monotone cubic.
fn pchip_slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let m: Vec<f64> = y
        .windows(2)
        .zip(h.iter())
        .map(|(w, hk)| (w[1] - w[0]) / hk)
        .collect();

    if n == 2 {
        return vec![m[0]; 2];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        if m[k - 1] * m[k] <= 0.0 {
            continue;
        }
        let w1 = 2.0 * h[k] + h[k - 1];
        let w2 = h[k] + 2.0 * h[k - 1];
        d[k] = (w1 + w2) / (w1 / m[k - 1] + w2 / m[k]);
    }
    d[0] = pchip_end_slope(h[0], h[1], m[0], m[1]);
    d[n - 1] = pchip_end_slope(h[n - 2], h[n - 3], m[n - 2], m[n - 3]);
    d
}

/// One-sided three-point slope, clamped to keep the end interval monotone.
fn pchip_end_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if d.signum() != m0.signum() || m0 == 0.0 {
        0.0
    } else if m0.signum() != m1.signum() && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}

fn eval_hermite(x: &[f64], y: &[f64], d: &[f64], q: f64) -> f64 {
    let Some(i) = interval(x, q) else {
        return f64::NAN;
    };
    let h = x[i + 1] - x[i];
    let t = (q - x[i]) / h;
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    h00 * y[i] + h10 * h * d[i] + h01 * y[i + 1] + h11 * h * d[i + 1]
}

/// Piecewise polynomial `y[i] + b[i]dx + c[i]dx^2 + d[i]dx^3` of a natural cubic spline.
struct NaturalSpline {
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl NaturalSpline {
    fn fit(x: &[f64], y: &[f64]) -> Self {
        let n = x.len();
        let k = n - 1;
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        // Tridiagonal system for the second-derivative coefficients.
        let mut alpha = vec![0.0; n];
        for i in 1..k {
            alpha[i] = 3.0 / h[i] * (y[i + 1] - y[i]) - 3.0 / h[i - 1] * (y[i] - y[i - 1]);
        }
        let mut l = vec![1.0; n];
        let mut mu = vec![0.0; n];
        let mut z = vec![0.0; n];
        for i in 1..k {
            l[i] = 2.0 * (x[i + 1] - x[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l[i];
            z[i] = (alpha[i] - h[i - 1] * z[i - 1]) / l[i];
        }

        let mut c = vec![0.0; n];
        let mut b = vec![0.0; k];
        let mut d = vec![0.0; k];
        for j in (0..k).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            b[j] = (y[j + 1] - y[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
            d[j] = (c[j + 1] - c[j]) / (3.0 * h[j]);
        }
        Self { b, c, d }
    }

    fn eval(&self, x: &[f64], y: &[f64], q: f64) -> f64 {
        let Some(i) = interval(x, q) else {
            return f64::NAN;
        };
        let dx = q - x[i];
        y[i] + self.b[i] * dx + self.c[i] * dx * dx + self.d[i] * dx * dx * dx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL: [InterpMethod; 4] = [
        InterpMethod::Nearest,
        InterpMethod::Linear,
        InterpMethod::Pchip,
        InterpMethod::Spline,
    ];

    #[test]
    fn reproduces_samples_for_every_method() {
        let x = [0., 1., 2., 4., 7.];
        let y = [1., -2., 0.5, 3., 3.];
        for method in ALL {
            let yq = interp1d(&x, &y, &x, method).unwrap();
            yq.iter()
                .zip(y.iter())
                .for_each(|(a, b)| assert_relative_eq!(a, b, epsilon = 1e-12));
        }
    }

    #[test]
    fn linear_data_is_reproduced_by_every_method_but_nearest() {
        let x = [0., 1., 2., 3., 5.];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v - 1.0).collect();
        let xq = [0.25, 1.5, 2.75, 4.0];
        for method in [InterpMethod::Linear, InterpMethod::Pchip, InterpMethod::Spline] {
            let yq = interp1d(&x, &y, &xq, method).unwrap();
            for (q, v) in xq.iter().zip(yq) {
                assert_relative_eq!(v, 2.0 * q - 1.0, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn nearest_ties_go_up() {
        let yq = interp1d(&[0., 2.], &[10., 20.], &[0.9, 1.0, 1.1], InterpMethod::Nearest).unwrap();
        assert_eq!(yq, vec![10., 20., 20.]);
    }

    #[test]
    fn pchip_does_not_overshoot_a_step() {
        let x = [0., 1., 2., 3.];
        let y = [0., 0., 1., 1.];
        let xq: Vec<f64> = (0..=30).map(|i| i as f64 * 0.1).collect();
        let yq = interp1d(&x, &y, &xq, InterpMethod::Pchip).unwrap();
        assert!(yq.iter().all(|v| (-1e-12..=1.0 + 1e-12).contains(v)));

        let spline = interp1d(&x, &y, &xq, InterpMethod::Spline).unwrap();
        assert!(spline.iter().any(|v| *v < 0.0 || *v > 1.0));
    }

    #[test]
    fn out_of_range_queries_are_nan() {
        for method in ALL {
            let yq = interp1d(&[1., 2.], &[1., 2.], &[0.5, f64::NAN, 2.5], method).unwrap();
            assert!(yq.iter().all(|v| v.is_nan()));
        }
    }

    #[test]
    fn rejects_malformed_samples() {
        assert!(interp1d(&[0.], &[1.], &[0.], InterpMethod::Linear).is_err());
        assert!(interp1d(&[0., 1.], &[1.], &[0.], InterpMethod::Linear).is_err());
        assert!(interp1d(&[0., 0.], &[1., 2.], &[0.], InterpMethod::Linear).is_err());
    }
}
