//! Reads 16-bit RGB TIFFs back into channel planes.

use std::io::Cursor;

use ndarray::Array2;
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::{debug, warn};

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::debayer::types::ChannelPlanes;
use crate::image_pipeline::metadata::types::CameraMetadata;

const PLANAR_CONFIG_SEPARATE: u32 = 2;

pub struct Tiff16Reader;

impl Tiff16Reader {
    pub fn new() -> Self {
        Self
    }

    /// Decodes the first image of `data`, restoring the metadata record from
    /// `ImageDescription` when it holds one.
    pub fn read(&self, data: &[u8]) -> Result<(ChannelPlanes, Option<CameraMetadata>)> {
        let mut decoder =
            Decoder::new(Cursor::new(data)).map_err(|e| GonetError::DecodeError(e.to_string()))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| GonetError::DecodeError(e.to_string()))?;
        let color_type = decoder
            .colortype()
            .map_err(|e| GonetError::DecodeError(e.to_string()))?;
        if color_type != ColorType::RGB(16) {
            return Err(GonetError::UnsupportedFormat(format!(
                "expected a 16-bit RGB TIFF, found {:?}",
                color_type
            )));
        }
        let planar = decoder
            .get_tag_u32(Tag::PlanarConfiguration)
            .map(|v| v == PLANAR_CONFIG_SEPARATE)
            .unwrap_or(false);
        let description = decoder.get_tag_ascii_string(Tag::ImageDescription).ok();

        debug!("Decoding TIFF image: {}x{} (planar: {})", width, height, planar);

        let samples = match decoder
            .read_image()
            .map_err(|e| GonetError::DecodeError(e.to_string()))?
        {
            DecodingResult::U16(samples) => samples,
            _ => {
                return Err(GonetError::UnsupportedFormat(
                    "TIFF samples are not 16-bit".to_string(),
                ));
            }
        };

        let planes = split_planes(&samples, width as usize, height as usize, planar)?;
        let metadata = match description {
            Some(text) => parse_description(&text)?,
            None => None,
        };
        Ok((planes, metadata))
    }
}

impl Default for Tiff16Reader {
    fn default() -> Self {
        Self::new()
    }
}

fn split_planes(samples: &[u16], width: usize, height: usize, planar: bool) -> Result<ChannelPlanes> {
    let pixels = width * height;
    if samples.len() != pixels * 3 {
        return Err(GonetError::DecodeError(format!(
            "expected {} samples for a {}x{} RGB image, got {}",
            pixels * 3,
            width,
            height,
            samples.len()
        )));
    }

    let plane = |channel: usize| {
        Array2::from_shape_fn((height, width), |(row, col)| {
            let index = if planar {
                channel * pixels + row * width + col
            } else {
                (row * width + col) * 3 + channel
            };
            samples[index] as f64
        })
    };

    Ok(ChannelPlanes {
        red: plane(0),
        green: plane(1),
        blue: plane(2),
    })
}

/// Metadata from an `ImageDescription` value. Descriptions that are not JSON
/// were written by other software and are ignored; JSON that is not an
/// object cannot be a metadata record.
pub fn parse_description(text: &str) -> Result<Option<CameraMetadata>> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => {
            debug!("ImageDescription is not JSON, ignoring it");
            return Ok(None);
        }
    };
    if !value.is_object() {
        return Err(GonetError::InvalidArgument(
            "metadata in ImageDescription must be a JSON object".to_string(),
        ));
    }
    match serde_json::from_value(value) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) => {
            warn!("Skipping unreadable metadata record: {}", e);
            Ok(None)
        }
    }
}
