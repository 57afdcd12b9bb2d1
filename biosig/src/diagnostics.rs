//! Recoverable data-quality reports.
//!
//! Gap-aware entry points never fail on data content. When a channel cannot be processed
//! as asked they return a well-defined NaN/empty result for it and attach a [Diagnostic].
//! Every diagnostic is also logged through `tracing` at `WARN` when it is raised.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Broad class of a [Diagnostic].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DiagnosticCategory {
    /// Not enough valid samples; the affected output is NaN, empty or unfiltered.
    InsufficientData,
    /// An omitted setting was replaced by a conservative fallback.
    ConfigurationAmbiguity,
}

/// A data-quality report raised while processing a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Diagnostic {
    /// Zero-phase filtering ran without a gap bound, so every gap was preserved as NaN.
    GapBoundOmitted,
    /// Every sample of the channel is missing.
    AllMissing {
        /// Channel index.
        channel: usize,
    },
    /// The channel, once boundary NaN are trimmed, is shorter than one window.
    SignalTooShort {
        /// Channel index.
        channel: usize,
        /// Trimmed length.
        len: usize,
        /// Window length.
        required: usize,
    },
    /// No gap-free run of the channel is at least one window long.
    NoValidSegments {
        /// Channel index.
        channel: usize,
        /// Length of the longest gap-free run.
        longest: usize,
        /// Window length.
        required: usize,
    },
    /// A segment between long gaps was too short to filter and was passed through unfiltered.
    SegmentTooShort {
        /// Channel index.
        channel: usize,
        /// First sample of the segment.
        start: usize,
        /// Segment length.
        len: usize,
        /// Minimum length the filter needs.
        required: usize,
    },
}

impl Diagnostic {
    /// Channel the diagnostic refers to, `None` for call-level reports.
    pub fn channel(&self) -> Option<usize> {
        match self {
            Diagnostic::GapBoundOmitted => None,
            Diagnostic::AllMissing { channel }
            | Diagnostic::SignalTooShort { channel, .. }
            | Diagnostic::NoValidSegments { channel, .. }
            | Diagnostic::SegmentTooShort { channel, .. } => Some(*channel),
        }
    }

    /// Broad class of the report.
    pub fn category(&self) -> DiagnosticCategory {
        match self {
            Diagnostic::GapBoundOmitted => DiagnosticCategory::ConfigurationAmbiguity,
            _ => DiagnosticCategory::InsufficientData,
        }
    }

    /// Log the diagnostic and hand it back.
    pub(crate) fn raise(self) -> Self {
        match &self {
            Diagnostic::GapBoundOmitted => {
                tracing::warn!("no gap bound given for zero-phase filtering, preserving every gap")
            }
            Diagnostic::AllMissing { channel } => {
                tracing::warn!(channel, "channel is entirely missing")
            }
            Diagnostic::SignalTooShort {
                channel,
                len,
                required,
            } => tracing::warn!(channel, len, required, "signal too short"),
            Diagnostic::NoValidSegments {
                channel,
                longest,
                required,
            } => tracing::warn!(channel, longest, required, "no valid segments"),
            Diagnostic::SegmentTooShort {
                channel,
                start,
                len,
                required,
            } => tracing::warn!(channel, start, len, required, "segment too short to filter"),
        }
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::GapBoundOmitted => write!(
                f,
                "No maximum gap length given for zero-phase filtering; all gaps preserved."
            ),
            Diagnostic::AllMissing { channel } => {
                write!(f, "Channel {channel} is entirely missing.")
            }
            Diagnostic::SignalTooShort {
                channel,
                len,
                required,
            } => write!(
                f,
                "Channel {channel}: signal too short ({len} valid samples, window needs {required})."
            ),
            Diagnostic::NoValidSegments {
                channel,
                longest,
                required,
            } => write!(
                f,
                "Channel {channel}: no valid segments (longest is {longest}, window needs {required})."
            ),
            Diagnostic::SegmentTooShort {
                channel,
                start,
                len,
                required,
            } => write!(
                f,
                "Channel {channel}: segment at {start} has {len} samples, filter needs {required}; left unfiltered."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_and_channels() {
        assert_eq!(Diagnostic::GapBoundOmitted.channel(), None);
        assert_eq!(
            Diagnostic::GapBoundOmitted.category(),
            DiagnosticCategory::ConfigurationAmbiguity
        );
        let d = Diagnostic::SignalTooShort {
            channel: 2,
            len: 10,
            required: 128,
        };
        assert_eq!(d.channel(), Some(2));
        assert_eq!(d.category(), DiagnosticCategory::InsufficientData);
        assert_eq!(
            d.to_string(),
            "Channel 2: signal too short (10 valid samples, window needs 128)."
        );
    }
}
