//! Linear filtering, plain and gap-aware.
//!
//! Functions located in the [`Filtering` section of
//! `scipy.signal`](https://docs.scipy.org/doc/scipy/reference/signal.html#filtering), restricted
//! to transfer-function (`b`, `a`) filters on 1D input, plus [filter_with_gaps] which applies
//! them segment-wise around missing data.

mod filtfilt;
mod gaps;
mod kernels;
mod lfilter;
mod lfilter_zi;

pub use filtfilt::*;
pub use gaps::*;
pub use kernels::*;
pub use lfilter::*;
pub use lfilter_zi::*;
