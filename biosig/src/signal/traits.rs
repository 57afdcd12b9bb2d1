//! Trait interfaces for signal-processing capabilities.
//!
//! These traits define the trait-first API shape shared by the kernels.

use crate::kernel::{ExecInvariantViolation, Read1D, ReadChannels, Write1D};
use crate::signal::filter::{ChannelFilterOutput, GapFilterOutput};
use crate::signal::spectral::{ChannelPsd, GapPsd};

/// 1D `lfilter` capability.
pub trait LFilter1D<T> {
    /// Run filtering into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Run filtering and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D `filtfilt` capability.
pub trait FiltFilt1D<T> {
    /// Run zero-phase filtering into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Run zero-phase filtering and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Periodogram of a single frame.
pub trait Periodogram1D {
    /// Compute frequencies and density into caller-provided buffers.
    fn run_into<I, OF, OP>(
        &self,
        input: &I,
        freqs: &mut OF,
        pxx: &mut OP,
    ) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        OF: Write1D<f64> + ?Sized,
        OP: Write1D<f64> + ?Sized;

    /// Compute and allocate `(freqs, pxx)`.
    fn run_alloc<I>(&self, input: &I) -> Result<(Vec<f64>, Vec<f64>), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized;
}

/// Gap-aware filtering capability.
pub trait GapFilter1D {
    /// Filter one channel into a caller-provided output buffer, returning its diagnostics.
    fn run_into<I, O>(
        &self,
        input: &I,
        out: &mut O,
    ) -> Result<Vec<crate::Diagnostic>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized;

    /// Filter one channel and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<ChannelFilterOutput, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized;

    /// Filter every channel of a samples x channels signal.
    fn run_channels<I>(&self, signal: &I) -> Result<GapFilterOutput, ExecInvariantViolation>
    where
        I: ReadChannels + ?Sized;
}

/// Gap-aware Welch PSD capability.
pub trait GapWelch1D {
    /// Estimate the PSD of one channel.
    fn run_alloc<I>(&self, input: &I) -> Result<ChannelPsd, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized;

    /// Estimate the PSD of every channel of a samples x channels signal.
    fn run_channels<I>(&self, signal: &I) -> Result<GapPsd, ExecInvariantViolation>
    where
        I: ReadChannels + ?Sized;
}
