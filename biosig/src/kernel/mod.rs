//! Shared trait-first kernel substrate.
//!
//! Constructor validation, 1D buffer adapters and the channel adapter used by the
//! multi-channel gap-aware entry points.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;
