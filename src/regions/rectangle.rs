//! Pie-slice cut out of an axis-aligned rectangle.
//!
//! The slice is the polygon `center -> start edge point -> corners -> end
//! edge point`, where the edge points are where rays at the start and end
//! bearings leave the rectangle, and the corners are those met going
//! counter-clockwise from start to end.

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::regions::angles::{AngularSpan, bearing_deg};
use crate::regions::mask::RegionMask;
use crate::regions::path::polygon_mask;

/// Rectangle of width `side1` (along columns) and height `side2` (along
/// rows) centered on `(cx, cy)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub cx: f64,
    pub cy: f64,
    pub side1: f64,
    pub side2: f64,
}

impl Rectangle {
    pub fn new(cx: f64, cy: f64, side1: f64, side2: f64) -> Result<Self> {
        if !(side1 > 0.0 && side2 > 0.0) || !side1.is_finite() || !side2.is_finite() {
            return Err(GonetError::OutOfRange(format!(
                "rectangle sides must be positive, got {} x {}",
                side1, side2
            )));
        }
        Ok(Self { cx, cy, side1, side2 })
    }

    /// Corners counter-clockwise from the one nearest -180 degrees:
    /// `(-w, -h)`, `(w, -h)`, `(w, h)`, `(-w, h)` around the center.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (w, h) = (self.side1 / 2.0, self.side2 / 2.0);
        [
            (self.cx - w, self.cy - h),
            (self.cx + w, self.cy - h),
            (self.cx + w, self.cy + h),
            (self.cx - w, self.cy + h),
        ]
    }

    fn corner_bearings(&self) -> [f64; 4] {
        self.corners().map(|(x, y)| bearing_deg(x, y, self.cx, self.cy))
    }

    /// Where a ray from the center at `angle` degrees leaves the rectangle.
    pub fn edge_point(&self, angle: f64) -> (f64, f64) {
        let [c0, c1, c2, c3] = self.corner_bearings();
        let (w, h) = (self.side1 / 2.0, self.side2 / 2.0);
        let tan = angle.to_radians().tan();
        let (dx, dy) = if angle < c0 || angle > c3 {
            (-w, -w * tan)
        } else if angle < c1 {
            (-h / tan, -h)
        } else if angle < c2 {
            (w, w * tan)
        } else {
            (h / tan, h)
        };
        (self.cx + dx, self.cy + dy)
    }

    /// Vertices of the slice between `span.start()` and `span.end()`, or the
    /// whole rectangle for a full span.
    pub fn sector_polygon(&self, span: &AngularSpan) -> Vec<(f64, f64)> {
        if span.is_full() {
            return self.corners().to_vec();
        }

        let width = span.width();
        let mut inner: Vec<(f64, (f64, f64))> = self
            .corners()
            .into_iter()
            .zip(self.corner_bearings())
            .map(|(corner, bearing)| (span.offset(bearing), corner))
            .filter(|&(offset, _)| offset > 0.0 && offset < width)
            .collect();
        inner.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut polygon = Vec::with_capacity(inner.len() + 3);
        polygon.push((self.cx, self.cy));
        polygon.push(self.edge_point(span.start()));
        polygon.extend(inner.into_iter().map(|(_, corner)| corner));
        polygon.push(self.edge_point(span.end()));
        polygon
    }
}

/// Mask of the slice of a `side1 x side2` rectangle between two bearings.
pub fn rectangle_sector(
    shape: (usize, usize),
    cx: f64,
    cy: f64,
    side1: f64,
    side2: f64,
    start: f64,
    end: f64,
) -> Result<RegionMask> {
    let rectangle = Rectangle::new(cx, cy, side1, side2)?;
    let span = AngularSpan::new(start, end)?;
    Ok(polygon_mask(shape, &rectangle.sector_polygon(&span)))
}
