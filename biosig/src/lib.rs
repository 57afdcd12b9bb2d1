#![warn(missing_docs)]
//! Gap-tolerant processing of biomedical signals.
//!
//! Recordings from wearable and bedside sensors are riddled with dropouts. This crate finds
//! them ([runs::find_runs]), decides which are short enough to bridge ([gaps]), and runs
//! filters ([signal::filter::filter_with_gaps]) and spectral estimators
//! ([signal::spectral::estimate_spectrum_with_gaps]) segment by segment around the ones
//! that are not, without letting missing data leak into valid samples.
//!
//! Signals are `samples x channels` matrices where NaN marks a missing sample. Channels are
//! processed independently (in parallel with the default `rayon` feature). Problems with the
//! data itself never fail a call: the affected channel gets a NaN result and a
//! [Diagnostic] that is also logged through `tracing`.

pub mod diagnostics;
pub mod gaps;
pub mod kernel;
pub mod runs;
pub mod signal;

pub use biosig_core::{Error, Result};
pub use diagnostics::{Diagnostic, DiagnosticCategory};
