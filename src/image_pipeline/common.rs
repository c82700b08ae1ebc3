//! Common utilities module
//!
//! This module contains the error type shared across the image pipeline and
//! the region engine.

pub mod error;

pub use error::{GonetError, Result};
