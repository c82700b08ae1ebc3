use ndarray::Array2;
use serde::Serialize;

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::gonet_image::{Channel, GonetImage};
use crate::regions::mask::RegionMask;

/// Sum, mean, population standard deviation and count of the plane values
/// a mask selects. An empty selection has zero total and count, and NaN
/// mean and deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtractionOutput {
    pub total_counts: f64,
    pub mean_counts: f64,
    pub std: f64,
    pub npixels: usize,
}

/// Reduces the pixels of `plane` selected by `mask`.
pub fn reduce(plane: &Array2<f64>, mask: &RegionMask) -> Result<ExtractionOutput> {
    if plane.dim() != mask.dim() {
        return Err(GonetError::InvalidArgument(format!(
            "mask shape {:?} does not match plane shape {:?}",
            mask.dim(),
            plane.dim()
        )));
    }

    let selected = || plane.iter().zip(mask.iter()).filter(|(_, m)| **m).map(|(&v, _)| v);

    let (total, npixels) = selected().fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if npixels == 0 {
        return Ok(ExtractionOutput {
            total_counts: 0.0,
            mean_counts: f64::NAN,
            std: f64::NAN,
            npixels: 0,
        });
    }

    let mean = total / npixels as f64;
    let variance = selected().map(|v| (v - mean) * (v - mean)).sum::<f64>() / npixels as f64;

    Ok(ExtractionOutput {
        total_counts: total,
        mean_counts: mean,
        std: variance.sqrt(),
        npixels,
    })
}

/// [`reduce`] applied to each plane of an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelExtraction {
    pub red: ExtractionOutput,
    pub green: ExtractionOutput,
    pub blue: ExtractionOutput,
}

impl ChannelExtraction {
    pub fn get(&self, channel: Channel) -> &ExtractionOutput {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }
}

pub fn reduce_channels(image: &GonetImage, mask: &RegionMask) -> Result<ChannelExtraction> {
    Ok(ChannelExtraction {
        red: reduce(image.red(), mask)?,
        green: reduce(image.green(), mask)?,
        blue: reduce(image.blue(), mask)?,
    })
}
