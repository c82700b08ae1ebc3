use ndarray::Array2;

use crate::image_pipeline::common::error::{GonetError, Result};

/// Largest value a 12-bit sample can hold.
pub const UINT12_MAX: f64 = 4095.0;
/// Largest value of the 16-bit output scale.
pub const UINT16_MAX: f64 = 65535.0;

/// Linearly maps a 12-bit value onto the 16-bit range.
///
/// Fails with `OutOfRange` for anything outside `[0, 4095]`, NaN included.
pub fn scale_uint12_to_16bit(value: f64) -> Result<f64> {
    if !(0.0..=UINT12_MAX).contains(&value) {
        return Err(GonetError::OutOfRange(format!(
            "{} is outside the 12-bit range [0, 4095]",
            value
        )));
    }
    Ok(value / UINT12_MAX * UINT16_MAX)
}

/// Applies [`scale_uint12_to_16bit`] to a whole plane, failing on the first
/// out-of-range sample.
pub fn scale_plane_to_16bit(plane: &Array2<f64>) -> Result<Array2<f64>> {
    if let Some(bad) = plane.iter().find(|v| !(0.0..=UINT12_MAX).contains(*v)) {
        return Err(GonetError::OutOfRange(format!(
            "plane sample {} is outside the 12-bit range [0, 4095]",
            bad
        )));
    }
    Ok(plane.mapv(|v| v / UINT12_MAX * UINT16_MAX))
}
