//! Image processing pipeline module
//!
//! Decodes GONet raw containers into calibrated [`GonetImage`]s, normalizes
//! their capture metadata and writes them out as 8-bit, 16-bit or FITS
//! images.

pub mod common;
pub mod conversions;
pub mod debayer;
pub mod formats;
pub mod gonet_image;
pub mod metadata;
pub mod raw;

pub use common::{GonetError, Result};

pub use raw::{GonetRawReader, RawGeometry, RawImageData, RawImageReader};

pub use debayer::{ChannelPlanes, SuperpixelDebayer, scale_uint12_to_16bit};

pub use metadata::{CameraMetadata, GpsPosition, MetadataExtractor, RawTags, ScalarValue, TagValue, WhiteBalance};

pub use gonet_image::{Channel, FileType, GonetImage, Provenance};

pub use formats::{ImageWriter, OutputFormat, TiffCompression, WriteConfig, WriteConfigBuilder};

pub use conversions::{DecodeConfig, DecodeConfigBuilder, GonetDecoder, decode};
