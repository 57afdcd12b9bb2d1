//! Numpy/scipy-like numeric primitives.

mod interp;

pub use interp::*;
