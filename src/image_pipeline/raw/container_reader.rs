//! Reader for the raw sensor dump appended to a GONet `.jpg` container.
//!
//! The camera writes an ordinary JPEG preview followed by the raw readout of
//! the sensor. The raw block always sits at a fixed distance from the end of
//! the file, so the reader seeks relative to end-of-file and reads one padded
//! line at a time, dropping the padding.
//!
//! Each line packs two 12-bit samples into three bytes:
//!
//! ```text
//! b0 = p0[11:4]   b1 = p1[11:4]   b2 = p1[3:0] << 4 | p0[3:0]
//! ```

use std::io::{Cursor, Read, Seek, SeekFrom};

use tracing::debug;

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::raw::reader::RawImageReader;
use crate::image_pipeline::raw::types::{BITS_PER_SAMPLE, RawGeometry, RawImageData};

/// Reads the Bayer grid out of a GONet raw container.
pub struct GonetRawReader;

impl RawImageReader for GonetRawReader {
    /// Locates the raw block in `data` and unpacks every line.
    ///
    /// # Errors
    ///
    /// * `InvalidDimensions` / `InvalidArgument` - inconsistent `geometry`
    /// * `DecodeError` - the container is shorter than the data offset, or
    ///   ends before the last padded line
    fn read_raw(&self, data: &[u8], geometry: &RawGeometry) -> Result<RawImageData> {
        geometry.validate()?;

        let data_offset = geometry.data_offset();
        if (data.len() as u64) < data_offset {
            return Err(GonetError::DecodeError(format!(
                "container holds {} bytes but the raw block starts {} bytes before its end",
                data.len(),
                data_offset
            )));
        }

        let mut cursor = Cursor::new(data);
        cursor.seek(SeekFrom::End(-(data_offset as i64)))?;
        debug!(
            "Raw block starts at byte {} of {}",
            cursor.position(),
            data.len()
        );

        let width = geometry.pixel_per_line;
        let height = geometry.pixel_per_column;
        let used = geometry.used_line_bytes();

        let mut samples = vec![0u16; width * height];
        let mut line = vec![0u8; geometry.padded_line_bytes];

        for (index, row) in samples.chunks_exact_mut(width).enumerate() {
            cursor.read_exact(&mut line).map_err(|e| {
                GonetError::DecodeError(format!(
                    "raw stream truncated at line {} of {}: {}",
                    index, height, e
                ))
            })?;
            unpack_line(&line[..used], row);
        }

        debug!("Unpacked Bayer grid: {}x{}", width, height);

        Ok(RawImageData {
            width,
            height,
            data: samples,
            bits_per_sample: BITS_PER_SAMPLE,
        })
    }
}

/// Unpacks one line of 12-bit samples. `out` must hold `2 * packed.len() / 3`
/// samples; even outputs come from the first byte of each triplet, odd
/// outputs from the second.
pub fn unpack_line(packed: &[u8], out: &mut [u16]) {
    for (triplet, pair) in packed.chunks_exact(3).zip(out.chunks_exact_mut(2)) {
        let (b0, b1, b2) = (triplet[0] as u16, triplet[1] as u16, triplet[2] as u16);
        pair[0] = (b0 << 4) | (b2 & 0x0F);
        pair[1] = (b1 << 4) | (b2 >> 4);
    }
}

/// Packs 12-bit samples into the camera's line format. Inverse of
/// [`unpack_line`]; used to build synthetic containers.
pub fn pack_line(samples: &[u16]) -> Vec<u8> {
    samples
        .chunks_exact(2)
        .flat_map(|pair| {
            let (p0, p1) = (pair[0] & 0x0FFF, pair[1] & 0x0FFF);
            [
                (p0 >> 4) as u8,
                (p1 >> 4) as u8,
                (((p1 & 0x0F) << 4) | (p0 & 0x0F)) as u8,
            ]
        })
        .collect()
}
