//! Decode orchestration
//!
//! Ties the raw container reader, the superpixel debayer and the metadata
//! extractor together, and reads back 16-bit TIFFs.

mod decode;
pub mod types;

#[cfg(test)]
mod tests;

pub use decode::{GonetDecoder, decode};
pub use types::{DecodeConfig, DecodeConfigBuilder, InputKind};
