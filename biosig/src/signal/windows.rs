//! Window weights and overlapping frame layout for spectral estimation.

use crate::kernel::ConfigError;
use core::f64::consts::PI;
use core::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Named window shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WindowKind {
    /// Rectangular window.
    Boxcar,
    /// Hann window.
    #[default]
    Hann,
    /// Hamming window.
    Hamming,
}

impl WindowKind {
    /// Symmetric weights of length `n`.
    pub fn weights(&self, n: usize) -> Vec<f64> {
        match self {
            WindowKind::Boxcar => vec![1.0; n],
            WindowKind::Hann => general_hamming(n, 0.5),
            WindowKind::Hamming => general_hamming(n, 0.54),
        }
    }
}

fn general_hamming(n: usize, alpha: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let nm1 = (n - 1) as f64;
    (0..n)
        .map(|i| alpha - (1.0 - alpha) * (2.0 * PI * i as f64 / nm1).cos())
        .collect()
}

/// Window given either by length (with a named shape) or by explicit weights.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WindowSpec {
    /// A [WindowKind] of the given length.
    Length {
        /// Number of samples per window.
        len: usize,
        /// Shape of the weights.
        kind: WindowKind,
    },
    /// Explicit weights. The window length is the number of weights.
    Weights(Vec<f64>),
}

impl WindowSpec {
    /// Hann window of length `len`.
    pub fn hann(len: usize) -> Self {
        WindowSpec::Length {
            len,
            kind: WindowKind::Hann,
        }
    }

    /// Number of samples per window.
    pub fn len(&self) -> usize {
        match self {
            WindowSpec::Length { len, .. } => *len,
            WindowSpec::Weights(w) => w.len(),
        }
    }

    /// Whether the window has no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate and materialise the weights.
    pub fn build(&self) -> Result<Vec<f64>, ConfigError> {
        let weights = match self {
            WindowSpec::Length { len, kind } => kind.weights(*len),
            WindowSpec::Weights(w) => w.clone(),
        };
        if weights.is_empty() {
            return Err(ConfigError::InvalidArgument {
                arg: "window",
                reason: "window length must be > 0",
            });
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(ConfigError::InvalidArgument {
                arg: "window",
                reason: "window weights must be finite",
            });
        }
        if weights.iter().all(|w| *w == 0.0) {
            return Err(ConfigError::InvalidArgument {
                arg: "window",
                reason: "window weights must not all be zero",
            });
        }
        Ok(weights)
    }
}

impl From<usize> for WindowSpec {
    fn from(len: usize) -> Self {
        WindowSpec::hann(len)
    }
}

impl From<Vec<f64>> for WindowSpec {
    fn from(weights: Vec<f64>) -> Self {
        WindowSpec::Weights(weights)
    }
}

/// Ranges of the overlapping frames of length `nperseg` that fit in `len` samples.
///
/// Frames start at `0` and advance by `nperseg - noverlap`; a trailing partial frame is
/// dropped. Nothing is returned when `nperseg == 0`, `noverlap >= nperseg` or
/// `len < nperseg`.
pub fn overlapping_windows(
    len: usize,
    nperseg: usize,
    noverlap: usize,
) -> impl Iterator<Item = Range<usize>> {
    let valid = nperseg > 0 && noverlap < nperseg && len >= nperseg;
    let count = if valid {
        (len - nperseg) / (nperseg - noverlap) + 1
    } else {
        0
    };
    let hop = nperseg.saturating_sub(noverlap);
    (0..count).map(move |k| k * hop..k * hop + nperseg)
}
