use super::ConfigError;

use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayViewMut1, Axis, Data, Ix1, Ix2};

/// Adapter trait for reading contiguous 1D input.
pub trait Read1D<T> {
    /// Borrow the underlying input as a contiguous slice.
    fn read_slice(&self) -> Result<&[T], ConfigError>;
}

/// Adapter trait for writing contiguous 1D output.
pub trait Write1D<T> {
    /// Borrow the underlying output as a mutable contiguous slice.
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError>;
}

impl<T> Read1D<T> for [T] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T> Write1D<T> for [T] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Read1D<T> for [T; N] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T> Read1D<T> for Vec<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self.as_slice())
    }
}

impl<T> Write1D<T> for Vec<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self.as_mut_slice())
    }
}

impl<T> Read1D<T> for Array1<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "array" })
    }
}

impl<T> Write1D<T> for Array1<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut()
            .ok_or(ConfigError::NonContiguous { arg: "array" })
    }
}

impl<T> Read1D<T> for ArrayView1<'_, T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "array_view" })
    }
}

impl<T> Write1D<T> for ArrayViewMut1<'_, T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut().ok_or(ConfigError::NonContiguous {
            arg: "array_view_mut",
        })
    }
}

/// Adapter trait for multi-channel signals laid out as samples x channels.
///
/// Channels of a standard-layout 2D array are strided columns, so they are gathered into
/// owned buffers. Each buffer is the private working copy of one channel pipeline.
pub trait ReadChannels {
    /// Number of samples per channel.
    fn n_samples(&self) -> usize;

    /// Number of channels.
    fn n_channels(&self) -> usize;

    /// Gather every channel into its own buffer, in channel order.
    fn read_channels(&self) -> Result<Vec<Vec<f64>>, ConfigError>;
}

impl<S> ReadChannels for ArrayBase<S, Ix2>
where
    S: Data<Elem = f64>,
{
    fn n_samples(&self) -> usize {
        self.len_of(Axis(0))
    }

    fn n_channels(&self) -> usize {
        self.len_of(Axis(1))
    }

    fn read_channels(&self) -> Result<Vec<Vec<f64>>, ConfigError> {
        Ok(self.axis_iter(Axis(1)).map(|column| column.to_vec()).collect())
    }
}

impl<S> ReadChannels for ArrayBase<S, Ix1>
where
    S: Data<Elem = f64>,
{
    fn n_samples(&self) -> usize {
        self.len()
    }

    fn n_channels(&self) -> usize {
        1
    }

    fn read_channels(&self) -> Result<Vec<Vec<f64>>, ConfigError> {
        Ok(vec![self.to_vec()])
    }
}

impl ReadChannels for [Vec<f64>] {
    fn n_samples(&self) -> usize {
        self.first().map_or(0, Vec::len)
    }

    fn n_channels(&self) -> usize {
        self.len()
    }

    fn read_channels(&self) -> Result<Vec<Vec<f64>>, ConfigError> {
        let n = self.n_samples();
        if self.iter().any(|channel| channel.len() != n) {
            return Err(ConfigError::InvalidArgument {
                arg: "signal",
                reason: "all channels must share the same length",
            });
        }
        Ok(self.to_vec())
    }
}

impl ReadChannels for Vec<Vec<f64>> {
    fn n_samples(&self) -> usize {
        self.as_slice().n_samples()
    }

    fn n_channels(&self) -> usize {
        self.len()
    }

    fn read_channels(&self) -> Result<Vec<Vec<f64>>, ConfigError> {
        self.as_slice().read_channels()
    }
}

/// Assemble equally long columns into a `rows x columns.len()` matrix.
///
/// `rows` is needed to shape the output when there are no columns.
pub(crate) fn stack_columns(rows: usize, columns: &[Vec<f64>]) -> Array2<f64> {
    Array2::from_shape_fn((rows, columns.len()), |(i, j)| columns[j][i])
}
