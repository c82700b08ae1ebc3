//! Output format selection and write configuration

use std::path::Path;

use crate::image_pipeline::common::error::{GonetError, Result};

/// Container written by [`GonetImage::write`](crate::image_pipeline::GonetImage::write).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Interleaved 8-bit RGB JPEG
    Jpeg8,
    /// Interleaved 8-bit RGB PNG
    Png8,
    /// 16-bit three-sample TIFF with the metadata record as JSON
    Tiff16,
    /// Multi-extension FITS, one float image extension per channel
    Fits,
}

impl OutputFormat {
    /// Picks the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| {
                GonetError::UnsupportedFormat(format!("{} has no extension", path.display()))
            })?;
        match extension.as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg8),
            "png" => Ok(OutputFormat::Png8),
            "tif" | "tiff" => Ok(OutputFormat::Tiff16),
            "fits" | "fit" | "fts" => Ok(OutputFormat::Fits),
            other => Err(GonetError::UnsupportedFormat(format!(
                "cannot write .{} files",
                other
            ))),
        }
    }
}

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

/// Options shared by every writer.
#[derive(Debug, Clone)]
pub struct WriteConfig {
    /// Multiply red and blue by the metadata gains before export
    /// (8-bit and 16-bit outputs only)
    pub white_balance: bool,
    /// JPEG quality, 1-100
    pub jpeg_quality: u8,
    /// TIFF compression method
    pub compression: TiffCompression,
    /// Predictor value for TIFF compression (2 for horizontal differencing)
    pub predictor: Option<u16>,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            white_balance: false,
            jpeg_quality: 95,
            compression: TiffCompression::None,
            predictor: None,
        }
    }
}

impl WriteConfig {
    pub fn builder() -> WriteConfigBuilder {
        WriteConfigBuilder::default()
    }
}

/// Builder for WriteConfig
#[derive(Default)]
pub struct WriteConfigBuilder {
    white_balance: Option<bool>,
    jpeg_quality: Option<u8>,
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
}

impl WriteConfigBuilder {
    pub fn white_balance(mut self, enable: bool) -> Self {
        self.white_balance = Some(enable);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = Some(quality);
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn build(self) -> WriteConfig {
        let default = WriteConfig::default();
        WriteConfig {
            white_balance: self.white_balance.unwrap_or(default.white_balance),
            jpeg_quality: self.jpeg_quality.unwrap_or(default.jpeg_quality).clamp(1, 100),
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
        }
    }
}
