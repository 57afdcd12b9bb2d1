//! Gap-aware segmented filtering.
//!
//! Missing samples (NaN) are split into short gaps, which are interpolated before filtering,
//! and long gaps, which are preserved. The channel is cut at every long gap and each segment
//! is filtered on its own, so filter transients never bridge a long gap and NaN never leaks
//! into valid data.

use super::filtfilt::filtfilt_with_zi;
use super::{lfilter_zi, FilterSpec};
use crate::diagnostics::Diagnostic;
use crate::gaps::{classify_gaps, interpolate, segments, trim_nan, InterpMethod};
use crate::kernel::{
    stack_columns, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, ReadChannels,
    Write1D,
};
use crate::runs::nan_runs;
use crate::signal::channels::map_channels;
use crate::signal::traits::GapFilter1D;
use biosig_core::Result;
use ndarray::Array2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How each segment is filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FilterMode {
    /// Single forward pass from rest, like [super::lfilter].
    Causal,
    /// Forward-backward pass, like [super::filtfilt].
    #[default]
    ZeroPhase,
}

/// Gap handling options for [filter_with_gaps].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GapFilterOptions {
    /// Filtering direction.
    pub mode: FilterMode,
    /// Longest gap that is interpolated. `None` preserves every gap.
    pub max_gap_len: Option<usize>,
    /// Interpolation used to fill short gaps.
    pub method: InterpMethod,
}

/// Constructor config for [`GapFilterKernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct GapFilterConfig {
    /// Filter coefficients.
    pub filter: FilterSpec,
    /// Gap handling.
    pub options: GapFilterOptions,
}

/// Result of filtering one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFilterOutput {
    /// Filtered samples, NaN where gaps were preserved.
    pub values: Vec<f64>,
    /// Data-quality reports for the channel.
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of filtering a samples x channels signal.
#[derive(Debug, Clone, PartialEq)]
pub struct GapFilterOutput {
    /// Filtered signal with the input's shape.
    pub signal: Array2<f64>,
    /// Call-level reports first, then per-channel reports in channel order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Trait-first gap-aware filter kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct GapFilterKernel {
    spec: FilterSpec,
    zi: Vec<f64>,
    options: GapFilterOptions,
}

impl KernelLifecycle for GapFilterKernel {
    type Config = GapFilterConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        let zi = match config.options.mode {
            FilterMode::Causal => Vec::new(),
            FilterMode::ZeroPhase => {
                lfilter_zi(&config.filter).map_err(|_| ConfigError::InvalidArgument {
                    arg: "a",
                    reason: "filter has a pole at z = 1, no steady-state initial conditions exist",
                })?
            }
        };
        Ok(Self {
            spec: config.filter,
            zi,
            options: config.options,
        })
    }
}

impl GapFilterKernel {
    /// Shortest segment that gets filtered. Shorter segments pass through unfiltered.
    ///
    /// Zero-phase filtering needs `3 * order` samples (at least one), a causal pass one.
    pub fn min_segment_len(&self) -> usize {
        match self.options.mode {
            FilterMode::Causal => 1,
            FilterMode::ZeroPhase => (3 * self.spec.order()).max(1),
        }
    }

    fn filter_segment(&self, x: &[f64]) -> Vec<f64> {
        match self.options.mode {
            FilterMode::Causal => self.spec.apply(x),
            FilterMode::ZeroPhase => {
                let padlen = (3 * self.spec.order()).min(x.len().saturating_sub(1));
                filtfilt_with_zi(&self.spec, &self.zi, x, padlen)
            }
        }
    }

    fn bound_omitted(&self, any_nan: bool) -> Option<Diagnostic> {
        let omitted = self.options.mode == FilterMode::ZeroPhase
            && self.options.max_gap_len.is_none()
            && any_nan;
        omitted.then(|| Diagnostic::GapBoundOmitted.raise())
    }

    fn filter_channel(&self, channel: usize, x: &[f64]) -> ChannelFilterOutput {
        let mut diagnostics = Vec::new();
        if x.is_empty() {
            return ChannelFilterOutput {
                values: Vec::new(),
                diagnostics,
            };
        }
        if x.iter().all(|v| v.is_nan()) {
            diagnostics.push(Diagnostic::AllMissing { channel }.raise());
            return ChannelFilterOutput {
                values: x.to_vec(),
                diagnostics,
            };
        }

        let gaps = classify_gaps(&nan_runs(x), self.options.max_gap_len);
        let required = self.min_segment_len();
        let mut values = vec![f64::NAN; x.len()];
        for segment in segments(x.len(), &gaps.long) {
            // Only short gaps remain inside a segment.
            let part = &x[segment.clone()];
            let filled = interpolate(part, &nan_runs(part), self.options.method);
            let Some(valid) = trim_nan(&filled) else {
                continue;
            };
            let start = segment.start + valid.start;
            let src = &filled[valid];
            let dst = &mut values[start..start + src.len()];
            if src.len() < required {
                diagnostics.push(
                    Diagnostic::SegmentTooShort {
                        channel,
                        start,
                        len: src.len(),
                        required,
                    }
                    .raise(),
                );
                dst.copy_from_slice(src);
            } else {
                tracing::trace!(channel, start, len = src.len(), "filtering segment");
                dst.copy_from_slice(&self.filter_segment(src));
            }
        }
        ChannelFilterOutput {
            values,
            diagnostics,
        }
    }
}

impl GapFilter1D for GapFilterKernel {
    fn run_into<I, O>(
        &self,
        input: &I,
        out: &mut O,
    ) -> core::result::Result<Vec<Diagnostic>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let output = self.run_alloc(input)?;
        let out_slice = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out_slice.len() != output.values.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: output.values.len(),
                got: out_slice.len(),
            });
        }
        out_slice.copy_from_slice(&output.values);
        Ok(output.diagnostics)
    }

    fn run_alloc<I>(
        &self,
        input: &I,
    ) -> core::result::Result<ChannelFilterOutput, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let mut diagnostics: Vec<Diagnostic> = self
            .bound_omitted(input.iter().any(|v| v.is_nan()))
            .into_iter()
            .collect();
        let output = self.filter_channel(0, input);
        diagnostics.extend(output.diagnostics);
        Ok(ChannelFilterOutput {
            values: output.values,
            diagnostics,
        })
    }

    fn run_channels<I>(
        &self,
        signal: &I,
    ) -> core::result::Result<GapFilterOutput, ExecInvariantViolation>
    where
        I: ReadChannels + ?Sized,
    {
        if signal.n_channels() == 0 {
            return Err(ConfigError::EmptyInput { arg: "signal" }.into());
        }
        let n_samples = signal.n_samples();
        let channels = signal.read_channels()?;
        tracing::debug!(
            channels = channels.len(),
            samples = n_samples,
            mode = ?self.options.mode,
            max_gap_len = ?self.options.max_gap_len,
            "gap-aware filtering"
        );

        let mut diagnostics: Vec<Diagnostic> = self
            .bound_omitted(channels.iter().flatten().any(|v| v.is_nan()))
            .into_iter()
            .collect();
        let outputs = map_channels(channels, |c, x| self.filter_channel(c, &x));
        let mut columns = Vec::with_capacity(outputs.len());
        for output in outputs {
            columns.push(output.values);
            diagnostics.extend(output.diagnostics);
        }
        Ok(GapFilterOutput {
            signal: stack_columns(n_samples, &columns),
            diagnostics,
        })
    }
}

/// Filter every channel of a samples x channels signal around its missing data.
///
/// Per channel: NaN runs no longer than `max_gap_len` are interpolated with `method`, the
/// channel is cut at the remaining (long) gaps, and every segment is filtered with `filter`
/// in `mode`. Long gaps come back as NaN, as do short gaps touching either end of the
/// channel. A segment shorter than [GapFilterKernel::min_segment_len] keeps its
/// interpolated but unfiltered values.
///
/// ## Errors
/// [biosig_core::Error::InvalidArg] for a signal without channels, ragged channels, or a
/// zero-phase filter with a pole at `z = 1`. Data-quality problems are reported in
/// [GapFilterOutput::diagnostics] instead.
///
/// # Examples
/// ```
/// use biosig::signal::filter::{filter_with_gaps, FilterMode, FilterSpec, GapFilterOptions};
/// use ndarray::array;
///
/// let spec = FilterSpec::fir(vec![0.5, 0.5]).unwrap();
/// let x = array![[1.0], [2.0], [f64::NAN], [4.0], [5.0], [6.0], [7.0]];
/// let options = GapFilterOptions {
///     mode: FilterMode::Causal,
///     max_gap_len: Some(2),
///     ..Default::default()
/// };
/// let out = filter_with_gaps(&spec, &x, options).unwrap();
/// assert!(out.signal.iter().all(|v| v.is_finite()));
/// ```
pub fn filter_with_gaps<I>(
    filter: &FilterSpec,
    signal: &I,
    options: GapFilterOptions,
) -> Result<GapFilterOutput>
where
    I: ReadChannels + ?Sized,
{
    let kernel = GapFilterKernel::try_new(GapFilterConfig {
        filter: filter.clone(),
        options,
    })?;
    Ok(kernel.run_channels(signal)?)
}

/// Single-channel form of [filter_with_gaps].
pub fn filter_channel_with_gaps(
    filter: &FilterSpec,
    channel: &[f64],
    options: GapFilterOptions,
) -> Result<ChannelFilterOutput> {
    let kernel = GapFilterKernel::try_new(GapFilterConfig {
        filter: filter.clone(),
        options,
    })?;
    Ok(kernel.run_alloc(channel)?)
}
