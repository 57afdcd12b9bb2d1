//! Trait-first kernel wrappers for the filtering primitives.

use super::filtfilt::filtfilt_with_zi;
use super::{lfilter_zi, FilterSpec};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::traits::{FiltFilt1D, LFilter1D};

fn write_checked<O>(out: &mut O, y: &[f64]) -> Result<(), ExecInvariantViolation>
where
    O: Write1D<f64> + ?Sized,
{
    let out_slice = out
        .write_slice_mut()
        .map_err(ExecInvariantViolation::from)?;
    if out_slice.len() != y.len() {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg: "out",
            expected: y.len(),
            got: out_slice.len(),
        });
    }
    out_slice.copy_from_slice(y);
    Ok(())
}

/// Constructor config for [`LFilterKernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct LFilterConfig {
    /// Numerator coefficients.
    pub b: Vec<f64>,
    /// Denominator coefficients.
    pub a: Vec<f64>,
}

/// 1D `lfilter` kernel, filtering from rest.
#[derive(Debug, Clone, PartialEq)]
pub struct LFilterKernel {
    spec: FilterSpec,
}

impl KernelLifecycle for LFilterKernel {
    type Config = LFilterConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self {
            spec: FilterSpec::try_new(config.b, config.a)?,
        })
    }
}

impl LFilter1D<f64> for LFilterKernel {
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let y = self.run_alloc(input)?;
        write_checked(out, &y)
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        Ok(self.spec.apply(input))
    }
}

/// Constructor config for [`FiltFiltKernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct FiltFiltConfig {
    /// Numerator coefficients.
    pub b: Vec<f64>,
    /// Denominator coefficients.
    pub a: Vec<f64>,
    /// Odd-extension length. Defaults to `3 * max(len(a), len(b))`.
    pub padlen: Option<usize>,
}

/// 1D `filtfilt` kernel. Steady-state conditions are solved once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FiltFiltKernel {
    spec: FilterSpec,
    zi: Vec<f64>,
    padlen: usize,
}

impl KernelLifecycle for FiltFiltKernel {
    type Config = FiltFiltConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let spec = FilterSpec::try_new(config.b, config.a)?;
        let zi = lfilter_zi(&spec).map_err(|_| ConfigError::InvalidArgument {
            arg: "a",
            reason: "filter has a pole at z = 1, no steady-state initial conditions exist",
        })?;
        let padlen = config.padlen.unwrap_or(3 * (spec.order() + 1));
        Ok(Self { spec, zi, padlen })
    }
}

impl FiltFilt1D<f64> for FiltFiltKernel {
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let y = self.run_alloc(input)?;
        write_checked(out, &y)
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        if !input.is_empty() && self.padlen >= input.len() {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "filtfilt input must be longer than padlen",
            });
        }
        Ok(filtfilt_with_zi(&self.spec, &self.zi, input, self.padlen))
    }
}
