use super::FilterSpec;
use biosig_core::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Transposed companion matrix of the normalised denominator `a` (`a[0] == 1`).
fn companion_transposed(a: &[f64]) -> DMatrix<f64> {
    let n = a.len() - 1;
    DMatrix::from_fn(n, n, |i, j| {
        if j == 0 {
            -a[i + 1]
        } else if i + 1 == j {
            1.0
        } else {
            0.0
        }
    })
}

/// Construct initial conditions for [super::lfilter] from the step response steady state.
///
/// After `scipy.signal.lfilter_zi`: solves `(I - A^T) zi = b[1:] - a[1:] * b[0]` where `A`
/// is the companion matrix of `a`.
///
/// ## Errors
/// The system is singular when the filter has a pole at `z = 1` (no steady state).
///
/// # Examples
/// ```
/// use biosig::signal::filter::{lfilter_zi, FilterSpec};
///
/// let spec = FilterSpec::try_new(vec![0.5, 0.5], vec![1.0]).unwrap();
/// let zi = lfilter_zi(&spec).unwrap();
/// assert!((zi[0] - 0.5).abs() < 1e-12);
/// ```
pub fn lfilter_zi(spec: &FilterSpec) -> Result<Vec<f64>> {
    let order = spec.order();
    if order == 0 {
        return Ok(Vec::new());
    }
    let (b, a) = (spec.b(), spec.a());

    let i_minus_a = DMatrix::<f64>::identity(order, order) - companion_transposed(a);
    let rhs = DVector::from_iterator(order, (1..=order).map(|k| b[k] - a[k] * b[0]));
    let zi = i_minus_a.lu().solve(&rhs).ok_or_else(|| {
        Error::invalid_arg(
            "a",
            "filter has a pole at z = 1, no steady-state initial conditions exist.",
        )
    })?;
    Ok(zi.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn step_response_starts_in_steady_state() {
        let spec = FilterSpec::try_new(vec![0.0675, 0.1349, 0.0675], vec![1.0, -1.143, 0.4128])
            .unwrap();
        let zi = lfilter_zi(&spec).unwrap();
        let mut z = zi.clone();
        let y = spec.run_with_state(&[1.0; 20], &mut z);
        let dc = spec.b().iter().sum::<f64>() / spec.a().iter().sum::<f64>();
        y.iter()
            .for_each(|v| assert_relative_eq!(*v, dc, max_relative = 1e-10));
        z.iter()
            .zip(zi.iter())
            .for_each(|(r, e)| assert_relative_eq!(*r, *e, max_relative = 1e-10));
    }

    #[test]
    fn integrator_has_no_steady_state() {
        let spec = FilterSpec::try_new(vec![1.0], vec![1.0, -1.0]).unwrap();
        assert!(lfilter_zi(&spec).is_err());
        let gain = FilterSpec::fir(vec![3.0]).unwrap();
        assert!(lfilter_zi(&gain).unwrap().is_empty());
    }
}
