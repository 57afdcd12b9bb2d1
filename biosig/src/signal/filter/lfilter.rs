use crate::kernel::ConfigError;
use biosig_core::Error;

/// Validated transfer-function coefficients `b / a`.
///
/// Both vectors are normalised by `a[0]` and zero-padded to the same length, so
/// `b().len() == a().len() == order() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl FilterSpec {
    /// Validate and normalise `b` and `a`.
    ///
    /// ## Errors
    /// Empty coefficient vectors, `a[0] == 0` and non-finite coefficients are rejected.
    pub fn try_new(b: impl Into<Vec<f64>>, a: impl Into<Vec<f64>>) -> Result<Self, ConfigError> {
        let mut b = b.into();
        let mut a = a.into();
        if b.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "b" });
        }
        if a.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "a" });
        }
        if b.iter().chain(a.iter()).any(|c| !c.is_finite()) {
            return Err(ConfigError::InvalidArgument {
                arg: "b/a",
                reason: "filter coefficients must be finite",
            });
        }
        let a0 = a[0];
        if a0 == 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "a",
                reason: "first element of a found to be zero",
            });
        }

        let n = b.len().max(a.len());
        b.resize(n, 0.0);
        a.resize(n, 0.0);
        b.iter_mut().chain(a.iter_mut()).for_each(|c| *c /= a0);
        Ok(Self { b, a })
    }

    /// FIR filter, `a = [1]`.
    pub fn fir(b: impl Into<Vec<f64>>) -> Result<Self, ConfigError> {
        Self::try_new(b, vec![1.0])
    }

    /// Normalised numerator.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Normalised denominator, `a()[0] == 1`.
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Filter order, `max(len(a), len(b)) - 1`.
    pub fn order(&self) -> usize {
        self.b.len() - 1
    }

    /// Filter `x` from the delay state `z` (length [order](Self::order)), updating `z`.
    pub(crate) fn run_with_state(&self, x: &[f64], z: &mut [f64]) -> Vec<f64> {
        let (b, a) = (&self.b, &self.a);
        let order = self.order();
        let mut y = Vec::with_capacity(x.len());
        for &xi in x {
            let yi = b[0] * xi + z.first().copied().unwrap_or(0.0);
            for k in 0..order {
                let next = if k + 1 < order { z[k + 1] } else { 0.0 };
                z[k] = b[k + 1] * xi + next - a[k + 1] * yi;
            }
            y.push(yi);
        }
        y
    }

    /// Filter `x` from rest.
    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        let mut z = vec![0.0; self.order()];
        self.run_with_state(x, &mut z)
    }
}

/// Filter data `x` with an IIR or FIR filter.
///
/// A direct form II transposed implementation of the standard difference equation,
/// after `scipy.signal.lfilter` on a 1D input.
///
/// ## Parameters
/// * `b` : The numerator coefficient vector.
/// * `a` : The denominator coefficient vector. If `a[0]` is not 1, both `a` and `b` are
///   normalized by `a[0]`.
/// * `x` : The input signal.
/// * `zi` : Initial conditions for the filter delays, of length `max(len(a), len(b)) - 1`.
///   Initial rest is assumed when `None`. See [super::lfilter_zi].
///
/// ## Returns
/// * `y` : The output of the digital filter.
/// * `zf` : Final filter delay values, returned only when `zi` was given.
///
/// # Examples
/// ```
/// use biosig::signal::filter::lfilter;
///
/// let b = [5., 4., 1., 2.];
/// let x = [1., 2., 3., 4., 3., 5., 6.];
/// let (y, zf) = lfilter(&b, &[1.], &x, None).unwrap();
/// assert_eq!(y, vec![5., 14., 24., 36., 38., 47., 61.]);
/// assert!(zf.is_none());
/// ```
pub fn lfilter(
    b: &[f64],
    a: &[f64],
    x: &[f64],
    zi: Option<&[f64]>,
) -> biosig_core::Result<(Vec<f64>, Option<Vec<f64>>)> {
    let spec = FilterSpec::try_new(b, a)?;
    match zi {
        None => Ok((spec.apply(x), None)),
        Some(zi) => {
            if zi.len() != spec.order() {
                return Err(Error::invalid_arg(
                    "zi",
                    format!(
                        "expected {} initial conditions, got {}.",
                        spec.order(),
                        zi.len()
                    ),
                ));
            }
            let mut z = zi.to_vec();
            let y = spec.run_with_state(x, &mut z);
            Ok((y, Some(z)))
        }
    }
}
