use ndarray::Array2;
use tracing::info;

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::debayer::scale::scale_plane_to_16bit;
use crate::image_pipeline::debayer::types::ChannelPlanes;
use crate::image_pipeline::raw::types::RawImageData;

/// Collapses each 2x2 Bayer block into one RGB sample.
///
/// With `S[column, line]` the unpacked grid, the output pixel at
/// `(row, col)` is:
///
/// * red   = `S[2col+1, 2row+1]`
/// * green = `(S[2col, 2row+1] + S[2col+1, 2row]) / 2`
/// * blue  = `S[2col, 2row]`
///
/// Planes come out already transposed to `(rows, columns)` and rescaled to
/// the 16-bit range.
#[derive(Debug, Default, Clone, Copy)]
pub struct SuperpixelDebayer;

impl SuperpixelDebayer {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, raw_image: &RawImageData) -> Result<ChannelPlanes> {
        let width = raw_image.width;
        let height = raw_image.height;
        if width % 2 != 0 || height % 2 != 0 || raw_image.data.len() != width * height {
            return Err(GonetError::InvalidDimensions(width, height));
        }
        info!("Starting superpixel downsample for image {}x{}", width, height);

        let dim = (height / 2, width / 2);
        let red = Array2::from_shape_fn(dim, |(row, col)| {
            raw_image.at(2 * col + 1, 2 * row + 1) as f64
        });
        let green = Array2::from_shape_fn(dim, |(row, col)| {
            let a = raw_image.at(2 * col, 2 * row + 1) as f64;
            let b = raw_image.at(2 * col + 1, 2 * row) as f64;
            (a + b) / 2.0
        });
        let blue = Array2::from_shape_fn(dim, |(row, col)| {
            raw_image.at(2 * col, 2 * row) as f64
        });

        Ok(ChannelPlanes {
            red: scale_plane_to_16bit(&red)?,
            green: scale_plane_to_16bit(&green)?,
            blue: scale_plane_to_16bit(&blue)?,
        })
    }
}
