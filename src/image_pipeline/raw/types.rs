//! RAW container geometry and decoded Bayer data types

use crate::image_pipeline::common::error::{GonetError, Result};

/// Offset in bytes from the end of the file to the start of the raw block,
/// before subtracting the header.
pub const RAW_FILE_OFFSET: u64 = 18_711_040;
/// Size of the header that precedes the pixel rows inside the raw block.
pub const RAW_HEADER_SIZE: u64 = 32_768;
/// Number of photosites per sensor line.
pub const PIXEL_PER_LINE: usize = 4056;
/// Number of sensor lines.
pub const PIXEL_PER_COLUMN: usize = 3040;
/// Bytes stored per line, padding included.
pub const PADDED_LINE_BYTES: usize = 6112;

/// Bits per packed sample in the raw stream.
pub const BITS_PER_SAMPLE: u32 = 12;

/// Byte layout of the raw dump hidden at the end of a GONet container.
///
/// Defaults are the GONet camera constants. Other values are only useful for
/// synthetic fixtures; the bit-level unpacking rules do not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawGeometry {
    pub pixel_per_line: usize,
    pub pixel_per_column: usize,
    pub padded_line_bytes: usize,
    pub raw_file_offset: u64,
    pub raw_header_size: u64,
}

impl Default for RawGeometry {
    fn default() -> Self {
        Self {
            pixel_per_line: PIXEL_PER_LINE,
            pixel_per_column: PIXEL_PER_COLUMN,
            padded_line_bytes: PADDED_LINE_BYTES,
            raw_file_offset: RAW_FILE_OFFSET,
            raw_header_size: RAW_HEADER_SIZE,
        }
    }
}

impl RawGeometry {
    /// Meaningful bytes at the start of each padded line (12 bits per pixel).
    pub fn used_line_bytes(&self) -> usize {
        self.pixel_per_line * BITS_PER_SAMPLE as usize / 8
    }

    /// Distance from end-of-file to the first pixel row.
    pub fn data_offset(&self) -> u64 {
        self.raw_file_offset.saturating_sub(self.raw_header_size)
    }

    /// Total number of bytes consumed by the pixel rows.
    pub fn block_len(&self) -> u64 {
        self.pixel_per_column as u64 * self.padded_line_bytes as u64
    }

    pub fn validate(&self) -> Result<()> {
        let (width, height) = (self.pixel_per_line, self.pixel_per_column);
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(GonetError::InvalidDimensions(width, height));
        }
        if self.raw_header_size > self.raw_file_offset {
            return Err(GonetError::InvalidArgument(format!(
                "raw header size {} exceeds raw file offset {}",
                self.raw_header_size, self.raw_file_offset
            )));
        }
        if self.used_line_bytes() > self.padded_line_bytes {
            return Err(GonetError::InvalidArgument(format!(
                "{} used bytes per line do not fit in {} padded bytes",
                self.used_line_bytes(),
                self.padded_line_bytes
            )));
        }
        if self.block_len() > self.data_offset() {
            return Err(GonetError::InvalidArgument(format!(
                "pixel block of {} bytes does not fit in data offset {}",
                self.block_len(),
                self.data_offset()
            )));
        }
        Ok(())
    }
}

/// Full-resolution Bayer grid unpacked from the raw stream
#[derive(Debug, Clone)]
pub struct RawImageData {
    /// Photosites per line
    pub width: usize,
    /// Number of lines
    pub height: usize,
    /// 12-bit samples, row-major: `data[line * width + column]`
    pub data: Vec<u16>,
    /// Bits per sample in the source stream
    pub bits_per_sample: u32,
}

impl RawImageData {
    /// Sample at `column` of `line`.
    #[inline]
    pub fn at(&self, column: usize, line: usize) -> u16 {
        self.data[line * self.width + column]
    }
}
