use std::ops::Range;

use ndarray::{Array2, s};

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::debayer::types::ChannelPlanes;
use crate::image_pipeline::gonet_image::types::{Channel, FileType, Provenance};
use crate::image_pipeline::metadata::types::CameraMetadata;

/// Three equally shaped color planes with optional metadata and provenance.
///
/// Planes are stored as `f64` whatever the source depth, so calibration
/// arithmetic cannot overflow. Instances are not mutated through their
/// accessors; the only in-place change is [`GonetImage::add_assign`].
#[derive(Debug, Clone, PartialEq)]
pub struct GonetImage {
    pub(super) red: Array2<f64>,
    pub(super) green: Array2<f64>,
    pub(super) blue: Array2<f64>,
    pub(super) metadata: Option<CameraMetadata>,
    pub(super) provenance: Option<Provenance>,
}

impl GonetImage {
    /// Builds an image, failing with `InvalidArgument` when the planes do
    /// not share a shape.
    pub fn new(
        red: Array2<f64>,
        green: Array2<f64>,
        blue: Array2<f64>,
        metadata: Option<CameraMetadata>,
        provenance: Option<Provenance>,
    ) -> Result<Self> {
        if red.dim() != green.dim() || red.dim() != blue.dim() {
            return Err(GonetError::InvalidArgument(format!(
                "channel planes must share a shape: red {:?}, green {:?}, blue {:?}",
                red.dim(),
                green.dim(),
                blue.dim()
            )));
        }
        Ok(Self {
            red,
            green,
            blue,
            metadata,
            provenance,
        })
    }

    pub fn from_planes(
        planes: ChannelPlanes,
        metadata: Option<CameraMetadata>,
        provenance: Option<Provenance>,
    ) -> Result<Self> {
        Self::new(planes.red, planes.green, planes.blue, metadata, provenance)
    }

    pub(crate) fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    pub fn red(&self) -> &Array2<f64> {
        &self.red
    }

    pub fn green(&self) -> &Array2<f64> {
        &self.green
    }

    pub fn blue(&self) -> &Array2<f64> {
        &self.blue
    }

    pub fn metadata(&self) -> Option<&CameraMetadata> {
        self.metadata.as_ref()
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    pub fn file_type(&self) -> Option<FileType> {
        self.provenance.as_ref().map(|p| p.file_type)
    }

    /// `(rows, columns)` of every plane.
    pub fn shape(&self) -> (usize, usize) {
        self.red.dim()
    }

    pub fn plane(&self, channel: Channel) -> &Array2<f64> {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    /// Plane by name; anything but `red`, `green` or `blue` is `OutOfRange`.
    pub fn channel(&self, name: &str) -> Result<&Array2<f64>> {
        let channel: Channel = name.parse()?;
        Ok(self.plane(channel))
    }

    /// Sub-image over `rows` x `columns`, keeping metadata and provenance.
    pub fn slice(&self, rows: Range<usize>, columns: Range<usize>) -> Result<GonetImage> {
        let (height, width) = self.shape();
        if rows.start > rows.end || rows.end > height || columns.start > columns.end || columns.end > width {
            return Err(GonetError::OutOfRange(format!(
                "slice {:?} x {:?} outside image of shape ({}, {})",
                rows, columns, height, width
            )));
        }
        let window = s![rows, columns];
        GonetImage::new(
            self.red.slice(window).to_owned(),
            self.green.slice(window).to_owned(),
            self.blue.slice(window).to_owned(),
            self.metadata.clone(),
            self.provenance.clone(),
        )
    }
}
