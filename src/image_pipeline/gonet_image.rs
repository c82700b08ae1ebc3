//! In-memory GONet image: three `f64` planes plus metadata and provenance.

pub mod arithmetic;
pub mod image;
pub mod types;

pub use arithmetic::{BinaryOp, Operand};
pub use image::GonetImage;
pub use types::{Channel, FileType, Provenance};
