//! Provenance and channel types for [`GonetImage`](super::GonetImage)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::error::GonetError;

/// Kind of capture a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Observational frame
    #[default]
    Science,
    /// Flat field, for pixel response correction
    Flat,
    /// Bias frame, for readout offset correction
    Bias,
    /// Dark frame, for dark current correction
    Dark,
}

/// Where an image came from. Only images read from disk have one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub path: PathBuf,
    pub file_type: FileType,
}

impl Provenance {
    pub fn new(path: impl Into<PathBuf>, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            file_type,
        }
    }
}

/// One of the three color planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = GonetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(Channel::Red),
            "green" => Ok(Channel::Green),
            "blue" => Ok(Channel::Blue),
            other => Err(GonetError::OutOfRange(format!(
                "invalid channel name: {}. Allowed channels: red, green, blue",
                other
            ))),
        }
    }
}
