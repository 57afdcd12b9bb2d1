//! Core types shared across the biosig workspace.
//!
//! Holds the crate-wide [`Error`] type and a handful of numpy-like numeric
//! primitives in [`num_rs`].

mod error;
pub mod num_rs;

pub use error::*;

/// Result type used throughout biosig.
pub type Result<T> = core::result::Result<T, Error>;
