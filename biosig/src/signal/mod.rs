//! Signal processing: filtering, windows and spectral estimation.

mod channels;
pub mod filter;
pub mod spectral;
pub mod traits;
pub mod windows;
