//! Welch spectral estimation over channels with missing data.
//!
//! Boundary NaN are trimmed, optionally gaps up to a bound are interpolated, and the
//! remaining NaN split the channel into valid runs. Every run at least one window long is
//! cut into overlapping windows; the periodograms of all windows of the channel are pooled
//! and averaged.

use super::FramePeriodogram;
use crate::diagnostics::Diagnostic;
use crate::gaps::{fill_gaps, trim_nan, valid_runs, InterpMethod};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, ReadChannels};
use crate::signal::channels::map_channels;
use crate::signal::traits::GapWelch1D;
use crate::signal::windows::{overlapping_windows, WindowSpec};
use biosig_core::Result;
use ndarray::{Array1, Array2, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Constructor config for [`GapWelchKernel`] and [estimate_spectrum_with_gaps].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GapWelchConfig {
    /// Sampling frequency in Hz.
    pub fs: f64,
    /// Window length (Hann) or explicit weights.
    pub window: WindowSpec,
    /// Samples shared by consecutive windows. Defaults to half the window.
    pub noverlap: Option<usize>,
    /// Transform size. Defaults to the window length.
    pub nfft: Option<usize>,
    /// Longest gap that is interpolated. `None` interpolates nothing.
    pub max_gap_len: Option<usize>,
    /// Interpolation used to fill gaps up to `max_gap_len`.
    pub method: InterpMethod,
    /// Return the per-window periodograms alongside the average.
    pub keep_windows: bool,
}

impl GapWelchConfig {
    /// Config with every optional setting at its default.
    pub fn new(fs: f64, window: WindowSpec) -> Self {
        Self {
            fs,
            window,
            noverlap: None,
            nfft: None,
            max_gap_len: None,
            method: InterpMethod::default(),
            keep_windows: false,
        }
    }
}

/// Spectrum of one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPsd {
    /// One-sided frequency axis in Hz.
    pub frequencies: Vec<f64>,
    /// Mean of the pooled window periodograms, NaN when no window could be formed.
    pub psd: Vec<f64>,
    /// Pooled periodograms, `nfreq x nwindows`, when requested.
    pub windows: Option<Array2<f64>>,
    /// Data-quality reports for the channel.
    pub diagnostics: Vec<Diagnostic>,
}

/// Per-window periodograms of a multi-channel estimate.
#[derive(Debug, Clone, PartialEq)]
pub enum PerWindowPsd {
    /// The signal had one channel: `nfreq x nwindows`.
    Single(Array2<f64>),
    /// One `nfreq x nwindows` matrix per channel; window counts may differ.
    PerChannel(Vec<Array2<f64>>),
}

/// Spectrum of a samples x channels signal.
#[derive(Debug, Clone, PartialEq)]
pub struct GapPsd {
    /// Frequency axis per channel, `nfreq x channels`.
    pub frequencies: Array2<f64>,
    /// Averaged density per channel, `nfreq x channels`.
    pub psd: Array2<f64>,
    /// Pooled periodograms, when requested.
    pub per_window: Option<PerWindowPsd>,
    /// Per-channel reports in channel order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Trait-first gap-aware Welch kernel.
#[derive(Debug, Clone)]
pub struct GapWelchKernel {
    frame: FramePeriodogram,
    noverlap: usize,
    max_gap_len: Option<usize>,
    method: InterpMethod,
    keep_windows: bool,
}

impl KernelLifecycle for GapWelchKernel {
    type Config = GapWelchConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        let frame = FramePeriodogram::try_new(&config.window, config.nfft, config.fs)?;
        let nperseg = frame.nperseg();
        let noverlap = config.noverlap.unwrap_or(nperseg / 2);
        if noverlap >= nperseg {
            return Err(ConfigError::InvalidArgument {
                arg: "noverlap",
                reason: "noverlap must be smaller than the window length",
            });
        }
        Ok(Self {
            frame,
            noverlap,
            max_gap_len: config.max_gap_len,
            method: config.method,
            keep_windows: config.keep_windows,
        })
    }
}

impl GapWelchKernel {
    /// Samples per window.
    pub fn nperseg(&self) -> usize {
        self.frame.nperseg()
    }

    /// Number of frequency bins.
    pub fn nfreq(&self) -> usize {
        self.frame.nfreq()
    }

    fn failed(&self, diagnostic: Diagnostic) -> ChannelPsd {
        ChannelPsd {
            frequencies: self.frame.frequencies(),
            psd: vec![f64::NAN; self.nfreq()],
            windows: self
                .keep_windows
                .then(|| Array2::zeros((self.nfreq(), 0))),
            diagnostics: vec![diagnostic.raise()],
        }
    }

    fn estimate(&self, channel: usize, x: &[f64]) -> ChannelPsd {
        let nperseg = self.nperseg();
        let Some(trimmed) = trim_nan(x).map(|range| &x[range]) else {
            if x.is_empty() {
                return self.failed(Diagnostic::SignalTooShort {
                    channel,
                    len: 0,
                    required: nperseg,
                });
            }
            return self.failed(Diagnostic::AllMissing { channel });
        };
        if trimmed.len() < nperseg {
            return self.failed(Diagnostic::SignalTooShort {
                channel,
                len: trimmed.len(),
                required: nperseg,
            });
        }

        let filled;
        let (data, runs) = if trimmed.iter().any(|v| v.is_nan()) {
            filled = match self.max_gap_len {
                Some(max_gap_len) => fill_gaps(trimmed, max_gap_len, self.method),
                None => trimmed.to_vec(),
            };
            (filled.as_slice(), valid_runs(&filled))
        } else {
            (trimmed, vec![0..trimmed.len()])
        };

        let frames: Vec<&[f64]> = runs
            .iter()
            .filter(|run| run.len() >= nperseg)
            .flat_map(|run| {
                overlapping_windows(run.len(), nperseg, self.noverlap)
                    .map(move |w| &data[run.start + w.start..run.start + w.end])
            })
            .collect();
        if frames.is_empty() {
            let longest = runs.iter().map(|run| run.len()).max().unwrap_or(0);
            return self.failed(Diagnostic::NoValidSegments {
                channel,
                longest,
                required: nperseg,
            });
        }
        tracing::trace!(
            channel,
            runs = runs.len(),
            windows = frames.len(),
            "pooled periodogram windows"
        );

        let nfreq = self.nfreq();
        let mut pool = Array2::zeros((nfreq, frames.len()));
        for (mut column, frame) in pool.axis_iter_mut(Axis(1)).zip(frames) {
            column.assign(&Array1::from_vec(self.frame.density(frame)));
        }
        let psd = pool
            .mean_axis(Axis(1))
            .map(|mean| mean.to_vec())
            .unwrap_or_else(|| vec![f64::NAN; nfreq]);

        ChannelPsd {
            frequencies: self.frame.frequencies(),
            psd,
            windows: self.keep_windows.then_some(pool),
            diagnostics: Vec::new(),
        }
    }
}

impl GapWelch1D for GapWelchKernel {
    fn run_alloc<I>(&self, input: &I) -> core::result::Result<ChannelPsd, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        Ok(self.estimate(0, input))
    }

    fn run_channels<I>(&self, signal: &I) -> core::result::Result<GapPsd, ExecInvariantViolation>
    where
        I: ReadChannels + ?Sized,
    {
        if signal.n_channels() == 0 {
            return Err(ConfigError::EmptyInput { arg: "signal" }.into());
        }
        let channels = signal.read_channels()?;
        let n_channels = channels.len();
        tracing::debug!(
            channels = n_channels,
            samples = signal.n_samples(),
            nperseg = self.nperseg(),
            noverlap = self.noverlap,
            nfft = self.frame.nfft(),
            "gap-aware welch"
        );

        let estimates = map_channels(channels, |c, x| self.estimate(c, &x));
        let nfreq = self.nfreq();
        let mut frequencies = Array2::zeros((nfreq, n_channels));
        let mut psd = Array2::zeros((nfreq, n_channels));
        let mut windows = Vec::with_capacity(n_channels);
        let mut diagnostics = Vec::new();
        for (c, estimate) in estimates.into_iter().enumerate() {
            frequencies
                .column_mut(c)
                .assign(&Array1::from_vec(estimate.frequencies));
            psd.column_mut(c).assign(&Array1::from_vec(estimate.psd));
            windows.extend(estimate.windows);
            diagnostics.extend(estimate.diagnostics);
        }

        let per_window = self.keep_windows.then(|| {
            if n_channels == 1 {
                PerWindowPsd::Single(windows.pop().unwrap_or_else(|| Array2::zeros((nfreq, 0))))
            } else {
                PerWindowPsd::PerChannel(windows)
            }
        });
        Ok(GapPsd {
            frequencies,
            psd,
            per_window,
            diagnostics,
        })
    }
}

/// Welch power spectral density of every channel of a samples x channels signal with missing
/// data.
///
/// Per channel:
/// 1. Leading and trailing NaN are trimmed. A channel left shorter than one window yields a
///    NaN density and a diagnostic.
/// 2. Without internal NaN the trimmed channel is cut into overlapping windows
///    (`stride = nperseg - noverlap`).
/// 3. Otherwise gaps up to `max_gap_len` are interpolated, the remaining NaN split the channel
///    into valid runs, and every run of at least one window is cut into windows. A channel
///    without such a run yields a NaN density and a diagnostic.
/// 4. The density is the mean over the pooled window periodograms.
///
/// ## Errors
/// [biosig_core::Error::InvalidArg] for invalid settings (window length 0, `noverlap` not
/// smaller than the window, `nfft` smaller than the window, non-positive `fs`), a signal
/// without channels or ragged channels.
///
/// # Examples
/// ```
/// use biosig::signal::spectral::{estimate_spectrum_with_gaps, GapWelchConfig};
/// use biosig::signal::windows::WindowSpec;
/// use ndarray::Array2;
///
/// let mut x = Array2::from_shape_fn((512, 1), |(i, _)| (i as f64 * 0.3).sin());
/// x[[200, 0]] = f64::NAN;
/// let mut config = GapWelchConfig::new(100.0, WindowSpec::hann(64));
/// config.max_gap_len = Some(2);
/// let psd = estimate_spectrum_with_gaps(&x, config).unwrap();
/// assert_eq!(psd.psd.dim(), (33, 1));
/// assert!(psd.diagnostics.is_empty());
/// ```
pub fn estimate_spectrum_with_gaps<I>(signal: &I, config: GapWelchConfig) -> Result<GapPsd>
where
    I: ReadChannels + ?Sized,
{
    let kernel = GapWelchKernel::try_new(config)?;
    Ok(kernel.run_channels(signal)?)
}

/// Single-channel form of [estimate_spectrum_with_gaps].
pub fn estimate_channel_spectrum_with_gaps(
    channel: &[f64],
    config: GapWelchConfig,
) -> Result<ChannelPsd> {
    let kernel = GapWelchKernel::try_new(config)?;
    Ok(kernel.run_alloc(channel)?)
}
