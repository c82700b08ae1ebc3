use std::io::{Cursor, Write};

use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder, colortype};
use tiff::tags::{Predictor, Tag};
use tracing::debug;

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::debayer::scale::UINT16_MAX;
use crate::image_pipeline::formats::rgb8_writer::interleave;
use crate::image_pipeline::formats::types::{TiffCompression, WriteConfig};
use crate::image_pipeline::formats::writer::{ImageWriter, export_planes};
use crate::image_pipeline::gonet_image::GonetImage;
use crate::image_pipeline::metadata::types::CameraMetadata;

/// 16-bit RGB TIFF. The metadata record, when present, is stored as JSON in
/// `ImageDescription`.
pub struct Tiff16Writer;

impl ImageWriter for Tiff16Writer {
    fn write_image(&self, image: &GonetImage, output: &mut dyn Write, config: &WriteConfig) -> Result<()> {
        let [red, green, blue] = export_planes(image, config)?;
        let (rows, cols) = red.dim();
        if rows == 0 || cols == 0 {
            return Err(GonetError::InvalidDimensions(cols, rows));
        }
        debug!("Encoding TIFF image: {}x{}", cols, rows);

        let samples = interleave(&red, &green, &blue, to_u16);
        let description = image.metadata().map(metadata_description).transpose()?;

        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| GonetError::EncodeError(e.to_string()))?
            .with_compression(compression(config.compression));

        if let Some(predictor_val) = config.predictor {
            let predictor = match predictor_val {
                2 => Predictor::Horizontal,
                _ => Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        let mut tiff_image = encoder
            .new_image::<colortype::RGB16>(cols as u32, rows as u32)
            .map_err(|e| GonetError::EncodeError(e.to_string()))?;
        if let Some(description) = &description {
            tiff_image
                .encoder()
                .write_tag(Tag::ImageDescription, description.as_str())
                .map_err(|e| GonetError::EncodeError(e.to_string()))?;
        }
        tiff_image
            .write_data(&samples)
            .map_err(|e| GonetError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}

fn compression(method: TiffCompression) -> Compression {
    match method {
        TiffCompression::None => Compression::Uncompressed,
        TiffCompression::Lzw => Compression::Lzw,
        TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
        TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
        TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
    }
}

/// Clips to the 16-bit range, then truncates toward zero.
#[inline]
fn to_u16(value: f64) -> u16 {
    value.clamp(0.0, UINT16_MAX) as u16
}

/// JSON for the `ImageDescription` tag. TIFF ASCII fields are 7-bit, so
/// anything else is written as a `\uXXXX` escape, which keeps the JSON valid.
fn metadata_description(metadata: &CameraMetadata) -> Result<String> {
    let json = serde_json::to_string(metadata).map_err(|e| GonetError::EncodeError(e.to_string()))?;
    let mut ascii = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            ascii.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                ascii.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    Ok(ascii)
}
