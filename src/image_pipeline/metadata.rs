//! Capture metadata module
//!
//! Reads the container's tag dictionary and normalizes it into a
//! [`CameraMetadata`] record.

pub mod tags;
pub mod types;
mod extractor;
mod exif_source;

pub use extractor::{MAX_EXTRA_TEXT_LEN, MetadataExtractor};
pub use exif_source::read_exif_tags;
pub use types::{CameraMetadata, GpsPosition, RawTags, ScalarValue, TagValue, WhiteBalance};
