//! Types for debayering operations

use ndarray::Array2;

/// Half-resolution channel planes produced by the superpixel downsample.
///
/// Planes are `(rows, columns)` in image orientation and hold values on the
/// 16-bit scale `[0, 65535]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPlanes {
    pub red: Array2<f64>,
    pub green: Array2<f64>,
    pub blue: Array2<f64>,
}

impl ChannelPlanes {
    /// `(rows, columns)` shared by the three planes.
    pub fn dim(&self) -> (usize, usize) {
        self.red.dim()
    }
}
