use std::io::Write;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use ndarray::Array2;
use tracing::debug;

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::debayer::scale::UINT16_MAX;
use crate::image_pipeline::formats::types::WriteConfig;
use crate::image_pipeline::formats::writer::{ImageWriter, export_planes};
use crate::image_pipeline::gonet_image::GonetImage;

pub struct JpegWriter;

pub struct PngWriter;

impl ImageWriter for JpegWriter {
    fn write_image(&self, image: &GonetImage, output: &mut dyn Write, config: &WriteConfig) -> Result<()> {
        let (width, height, pixels) = rgb8_pixels(image, config)?;
        debug!("Encoding JPEG image: {}x{} (quality {})", width, height, config.jpeg_quality);

        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, config.jpeg_quality)
            .encode(&pixels, width, height, ExtendedColorType::Rgb8)
            .map_err(|e| GonetError::EncodeError(e.to_string()))?;
        output.write_all(&buffer)?;

        debug!("JPEG encoding complete");
        Ok(())
    }
}

impl ImageWriter for PngWriter {
    fn write_image(&self, image: &GonetImage, output: &mut dyn Write, config: &WriteConfig) -> Result<()> {
        let (width, height, pixels) = rgb8_pixels(image, config)?;
        debug!("Encoding PNG image: {}x{}", width, height);

        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(&pixels, width, height, ExtendedColorType::Rgb8)
            .map_err(|e| GonetError::EncodeError(e.to_string()))?;
        output.write_all(&buffer)?;

        debug!("PNG encoding complete");
        Ok(())
    }
}

/// `round(v / 65535 * 255)`, saturating when white balance pushed `v`
/// past the 16-bit range.
#[inline]
pub fn to_u8(value: f64) -> u8 {
    (value / UINT16_MAX * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Interleaved RGB bytes, row-major.
fn rgb8_pixels(image: &GonetImage, config: &WriteConfig) -> Result<(u32, u32, Vec<u8>)> {
    let [red, green, blue] = export_planes(image, config)?;
    let (rows, cols) = red.dim();
    if rows == 0 || cols == 0 {
        return Err(GonetError::InvalidDimensions(cols, rows));
    }
    Ok((cols as u32, rows as u32, interleave(&red, &green, &blue, to_u8)))
}

pub(crate) fn interleave<T>(
    red: &Array2<f64>,
    green: &Array2<f64>,
    blue: &Array2<f64>,
    convert: impl Fn(f64) -> T,
) -> Vec<T> {
    let mut out = Vec::with_capacity(red.len() * 3);
    for ((&r, &g), &b) in red.iter().zip(green.iter()).zip(blue.iter()) {
        out.push(convert(r));
        out.push(convert(g));
        out.push(convert(b));
    }
    out
}
