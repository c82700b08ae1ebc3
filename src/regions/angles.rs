//! Bearings in degrees, normalized to `(-180, 180]`.

use crate::image_pipeline::common::error::{GonetError, Result};

/// Maps any finite angle into `(-180, 180]`. `0` and `180` map to
/// themselves, `-180` maps to `180`.
pub fn normalize_angle_deg(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Bearing of `(x, y)` seen from `(cx, cy)`, in degrees.
#[inline]
pub fn bearing_deg(x: f64, y: f64, cx: f64, cy: f64) -> f64 {
    (y - cy).atan2(x - cx).to_degrees()
}

/// Counter-clockwise span from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularSpan {
    start: f64,
    end: f64,
}

impl AngularSpan {
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(GonetError::InvalidArgument(format!(
                "angles must be finite, got start={} end={}",
                start, end
            )));
        }
        Ok(Self {
            start: normalize_angle_deg(start),
            end: normalize_angle_deg(end),
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// A span whose bounds coincide covers the whole turn.
    pub fn is_full(&self) -> bool {
        let width = self.end - self.start;
        width == 0.0 || width == 360.0
    }

    /// Whether a normalized bearing lies in the span, bounds included. A span
    /// with `end < start` wraps through ±180.
    pub fn contains(&self, angle: f64) -> bool {
        if self.end >= self.start {
            angle >= self.start && angle <= self.end
        } else {
            angle >= self.start || angle <= self.end
        }
    }

    /// Counter-clockwise distance from `start` to `angle`, in `[0, 360)`.
    pub fn offset(&self, angle: f64) -> f64 {
        (angle - self.start).rem_euclid(360.0)
    }

    /// Counter-clockwise width of the span, in `[0, 360)`.
    pub fn width(&self) -> f64 {
        self.offset(self.end)
    }
}
