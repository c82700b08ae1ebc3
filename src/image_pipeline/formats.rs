//! Image writers (8-bit JPEG/PNG, 16-bit TIFF, multi-extension FITS) and
//! the 16-bit TIFF reader.

mod fits_writer;
mod output;
mod rgb8_writer;
mod tiff_reader;
mod tiff_writer;
mod writer;
pub mod types;

pub use fits_writer::{FitsWriter, sanitize_key};
pub use output::writer_for;
pub use rgb8_writer::{JpegWriter, PngWriter};
pub use tiff_reader::{Tiff16Reader, parse_description};
pub use tiff_writer::Tiff16Writer;
pub use types::{OutputFormat, TiffCompression, WriteConfig, WriteConfigBuilder};
pub use writer::ImageWriter;
