//! Decode configuration types

use std::path::Path;

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::gonet_image::FileType;
use crate::image_pipeline::raw::RawGeometry;

/// What a decodable file holds, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// GONet `.jpg` container with the raw dump appended
    RawContainer,
    /// 16-bit RGB TIFF, usually one written by this crate
    Tiff16,
}

impl InputKind {
    /// Extensions are matched exactly: `jpg` for the container, `tif` or
    /// `tiff` in either all-lower or all-upper case for TIFF.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jpg") => Ok(InputKind::RawContainer),
            Some("tif" | "tiff" | "TIF" | "TIFF") => Ok(InputKind::Tiff16),
            _ => Err(GonetError::UnsupportedFormat(format!(
                "cannot decode {}",
                path.display()
            ))),
        }
    }
}

/// Configuration for decoding a GONet file
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// Layout of the raw block inside the container
    pub geometry: RawGeometry,
    /// Capture kind recorded in the image provenance
    pub file_type: FileType,
    /// Whether to build the metadata record
    pub extract_metadata: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            geometry: RawGeometry::default(),
            file_type: FileType::Science,
            extract_metadata: true,
        }
    }
}

impl DecodeConfig {
    pub fn builder() -> DecodeConfigBuilder {
        DecodeConfigBuilder::default()
    }
}

/// Builder for DecodeConfig
#[derive(Default)]
pub struct DecodeConfigBuilder {
    geometry: Option<RawGeometry>,
    file_type: Option<FileType>,
    extract_metadata: Option<bool>,
}

impl DecodeConfigBuilder {
    pub fn geometry(mut self, geometry: RawGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn file_type(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }

    pub fn extract_metadata(mut self, enable: bool) -> Self {
        self.extract_metadata = Some(enable);
        self
    }

    pub fn build(self) -> DecodeConfig {
        let default = DecodeConfig::default();
        DecodeConfig {
            geometry: self.geometry.unwrap_or(default.geometry),
            file_type: self.file_type.unwrap_or(default.file_type),
            extract_metadata: self.extract_metadata.unwrap_or(default.extract_metadata),
        }
    }
}
