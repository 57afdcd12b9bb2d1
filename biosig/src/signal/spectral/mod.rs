//! Spectral estimation analogous to `scipy.signal.periodogram` / `scipy.signal.welch`, and
//! its gap-aware variant [estimate_spectrum_with_gaps].

mod gaps;

pub use gaps::*;

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::traits::Periodogram1D;
use crate::signal::windows::WindowSpec;
use core::fmt;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

fn rfft_real(fft: &dyn Fft<f64>, x: impl Iterator<Item = f64>, nfft: usize) -> Vec<Complex<f64>> {
    let mut buf = vec![Complex::new(0.0, 0.0); nfft];
    for (dst, src) in buf.iter_mut().zip(x) {
        *dst = Complex::new(src, 0.0);
    }
    fft.process(&mut buf);
    buf
}

/// One-sided frequency axis `k * fs / nfft`, `k = 0..=nfft / 2`.
pub fn onesided_freqs(nfft: usize, fs: f64) -> Vec<f64> {
    let n_freq = nfft / 2 + 1;
    (0..n_freq).map(|k| k as f64 * fs / nfft as f64).collect()
}

fn onesided_psd(spec: &[Complex<f64>], fs: f64, norm: f64) -> Vec<f64> {
    let nfft = spec.len();
    let n_freq = nfft / 2 + 1;
    (0..n_freq)
        .map(|k| {
            let v = spec[k].norm_sqr() / (fs * norm);
            if k != 0 && !(nfft % 2 == 0 && k == nfft / 2) {
                2.0 * v
            } else {
                v
            }
        })
        .collect()
}

/// Validated window, transform size and sample rate with a planned FFT.
///
/// Computes one-sided power spectral densities of frames of exactly `window.len()` samples,
/// zero padded to `nfft`. Cheap to share across threads.
#[derive(Clone)]
pub struct FramePeriodogram {
    window: Vec<f64>,
    nfft: usize,
    fs: f64,
    norm: f64,
    fft: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for FramePeriodogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePeriodogram")
            .field("nperseg", &self.window.len())
            .field("nfft", &self.nfft)
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl FramePeriodogram {
    /// Plan a periodogram for `window`, zero padded to `nfft` (defaults to the window length).
    pub fn try_new(window: &WindowSpec, nfft: Option<usize>, fs: f64) -> Result<Self, ConfigError> {
        if !fs.is_finite() || fs <= 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "fs",
                reason: "fs must be finite and > 0",
            });
        }
        let window = window.build()?;
        let nfft = nfft.unwrap_or(window.len());
        if nfft < window.len() {
            return Err(ConfigError::InvalidArgument {
                arg: "nfft",
                reason: "nfft must be greater than or equal to the window length",
            });
        }
        let norm = window.iter().map(|w| w * w).sum::<f64>();
        let fft = FftPlanner::<f64>::new().plan_fft_forward(nfft);
        Ok(Self {
            window,
            nfft,
            fs,
            norm,
            fft,
        })
    }

    /// Frame length.
    pub fn nperseg(&self) -> usize {
        self.window.len()
    }

    /// Transform size.
    pub fn nfft(&self) -> usize {
        self.nfft
    }

    /// Number of one-sided frequency bins, `nfft / 2 + 1`.
    pub fn nfreq(&self) -> usize {
        self.nfft / 2 + 1
    }

    /// One-sided frequency axis in Hz.
    pub fn frequencies(&self) -> Vec<f64> {
        onesided_freqs(self.nfft, self.fs)
    }

    /// Density of one frame. `frame.len()` must equal [nperseg](Self::nperseg).
    pub(crate) fn density(&self, frame: &[f64]) -> Vec<f64> {
        let windowed = frame.iter().zip(self.window.iter()).map(|(x, w)| x * w);
        let spec = rfft_real(self.fft.as_ref(), windowed, self.nfft);
        onesided_psd(&spec, self.fs, self.norm)
    }
}

/// Estimate the power spectral density of a single frame.
///
/// ## Parameters
/// * `frame` : Samples, as many as the window has weights.
/// * `window` : Window length (Hann) or explicit weights.
/// * `nfft` : Transform size, zero padding the frame. Defaults to the frame length.
/// * `fs` : Sampling frequency in Hz.
///
/// ## Returns
/// `(frequencies, pxx)`, both of length `nfft / 2 + 1`. The density is one-sided,
/// `|X|^2 / (fs * sum(w^2))`, doubled everywhere except DC and the Nyquist bin of even `nfft`.
///
/// # Examples
/// ```
/// use biosig::signal::spectral::periodogram;
/// use biosig::signal::windows::WindowSpec;
///
/// let x = vec![1.0; 8];
/// let (f, p) = periodogram(&x, &WindowSpec::Weights(vec![1.0; 8]), None, 8.0).unwrap();
/// assert_eq!(f, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
/// assert!((p[0] - 1.0).abs() < 1e-12);
/// assert!(p[1..].iter().all(|v| v.abs() < 1e-12));
/// ```
pub fn periodogram(
    frame: &[f64],
    window: &WindowSpec,
    nfft: Option<usize>,
    fs: f64,
) -> biosig_core::Result<(Vec<f64>, Vec<f64>)> {
    let kernel = PeriodogramKernel::try_new(PeriodogramConfig {
        fs,
        window: window.clone(),
        nfft,
    })?;
    Ok(kernel.run_alloc(frame)?)
}

/// Constructor config for [`PeriodogramKernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodogramConfig {
    /// Sampling frequency in Hz.
    pub fs: f64,
    /// Window applied to each frame.
    pub window: WindowSpec,
    /// Transform size. Defaults to the window length.
    pub nfft: Option<usize>,
}

/// Trait-first single-frame periodogram kernel.
#[derive(Debug, Clone)]
pub struct PeriodogramKernel {
    frame: FramePeriodogram,
}

impl KernelLifecycle for PeriodogramKernel {
    type Config = PeriodogramConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self {
            frame: FramePeriodogram::try_new(&config.window, config.nfft, config.fs)?,
        })
    }
}

impl PeriodogramKernel {
    fn checked_input<'a, I>(&self, input: &'a I) -> Result<&'a [f64], ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        if input.len() != self.frame.nperseg() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "frame",
                expected: self.frame.nperseg(),
                got: input.len(),
            });
        }
        Ok(input)
    }
}

impl Periodogram1D for PeriodogramKernel {
    fn run_into<I, OF, OP>(
        &self,
        input: &I,
        freqs: &mut OF,
        pxx: &mut OP,
    ) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        OF: Write1D<f64> + ?Sized,
        OP: Write1D<f64> + ?Sized,
    {
        let input = self.checked_input(input)?;
        let expected = self.frame.nfreq();
        let freqs_out = freqs
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if freqs_out.len() != expected {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "freqs",
                expected,
                got: freqs_out.len(),
            });
        }
        let pxx_out = pxx
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if pxx_out.len() != expected {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "pxx",
                expected,
                got: pxx_out.len(),
            });
        }

        freqs_out.copy_from_slice(&self.frame.frequencies());
        pxx_out.copy_from_slice(&self.frame.density(input));
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<(Vec<f64>, Vec<f64>), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = self.checked_input(input)?;
        Ok((self.frame.frequencies(), self.frame.density(input)))
    }
}
