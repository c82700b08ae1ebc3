//! RAW container reading module
//!
//! This module locates and unpacks the 12-bit Bayer dump stored at the end of
//! a GONet container file.

mod reader;
mod container_reader;
pub mod types;

pub use reader::RawImageReader;
pub use container_reader::{GonetRawReader, pack_line, unpack_line};
pub use types::{RawGeometry, RawImageData};
