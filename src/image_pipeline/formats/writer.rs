use std::io::Write;

use ndarray::Array2;

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::debayer::scale::UINT16_MAX;
use crate::image_pipeline::formats::types::WriteConfig;
use crate::image_pipeline::gonet_image::GonetImage;

pub trait ImageWriter {
    fn write_image(&self, image: &GonetImage, output: &mut dyn Write, config: &WriteConfig) -> Result<()>;
}

/// Planes clipped to `[0, 65535]`, then scaled by the white-balance gains
/// when `config.white_balance` is set. NaN clips to 0.
pub(crate) fn export_planes(image: &GonetImage, config: &WriteConfig) -> Result<[Array2<f64>; 3]> {
    let clip = |plane: &Array2<f64>| plane.mapv(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, UINT16_MAX) });
    let mut red = clip(image.red());
    let green = clip(image.green());
    let mut blue = clip(image.blue());

    if config.white_balance {
        let gains = image
            .metadata()
            .ok_or_else(|| {
                GonetError::MissingMetadata(
                    "white balance requested but the image has no metadata".to_string(),
                )
            })?
            .white_balance_gains()?;
        red.mapv_inplace(|v| v * gains.red);
        blue.mapv_inplace(|v| v * gains.blue);
    }

    Ok([red, green, blue])
}
