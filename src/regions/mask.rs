//! Boolean pixel masks over a channel plane.
//!
//! Pixel `(x, y)` is column `x`, row `y`; a mask for a plane of shape
//! `(rows, cols)` has the same shape.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::regions::angles::{AngularSpan, bearing_deg};
use crate::regions::path::{parse_path, polygon_mask};
use crate::regions::rectangle::rectangle_sector;

pub type RegionMask = Array2<bool>;

fn check_radius(name: &str, radius: f64) -> Result<()> {
    if !(radius > 0.0) || !radius.is_finite() {
        return Err(GonetError::OutOfRange(format!(
            "{} must be positive, got {}",
            name, radius
        )));
    }
    Ok(())
}

fn squared_distance(x: usize, y: usize, cx: f64, cy: f64) -> f64 {
    let (dx, dy) = (x as f64 - cx, y as f64 - cy);
    dx * dx + dy * dy
}

/// Pixels strictly closer than `radius` to `(cx, cy)`.
pub fn circle(shape: (usize, usize), cx: f64, cy: f64, radius: f64) -> Result<RegionMask> {
    check_radius("radius", radius)?;
    let r2 = radius * radius;
    Ok(Array2::from_shape_fn(shape, |(y, x)| {
        squared_distance(x, y, cx, cy) < r2
    }))
}

/// Disk of `radius` restricted to bearings between `start` and `end`.
pub fn sector(
    shape: (usize, usize),
    cx: f64,
    cy: f64,
    radius: f64,
    start: f64,
    end: f64,
) -> Result<RegionMask> {
    let span = AngularSpan::new(start, end)?;
    if span.is_full() {
        return circle(shape, cx, cy, radius);
    }
    check_radius("radius", radius)?;
    let r2 = radius * radius;
    Ok(Array2::from_shape_fn(shape, |(y, x)| {
        squared_distance(x, y, cx, cy) < r2
            && span.contains(bearing_deg(x as f64, y as f64, cx, cy))
    }))
}

/// Ring `inner_radius <= d < outer_radius` restricted to bearings between
/// `start` and `end`. The strict outer bound matches [`circle`], so a
/// full-span ring is exactly `circle(outer) && !circle(inner)`.
pub fn annular_sector(
    shape: (usize, usize),
    cx: f64,
    cy: f64,
    inner_radius: f64,
    outer_radius: f64,
    start: f64,
    end: f64,
) -> Result<RegionMask> {
    check_radius("inner radius", inner_radius)?;
    check_radius("outer radius", outer_radius)?;
    if inner_radius >= outer_radius {
        return Err(GonetError::OutOfRange(format!(
            "inner radius {} must be smaller than outer radius {}",
            inner_radius, outer_radius
        )));
    }
    let span = AngularSpan::new(start, end)?;
    let full = span.is_full();
    let (r2_inner, r2_outer) = (inner_radius * inner_radius, outer_radius * outer_radius);
    Ok(Array2::from_shape_fn(shape, |(y, x)| {
        let d2 = squared_distance(x, y, cx, cy);
        d2 >= r2_inner
            && d2 < r2_outer
            && (full || span.contains(bearing_deg(x as f64, y as f64, cx, cy)))
    }))
}

/// Pixels inside a path like `M 10,10 L 50,10 L 30,40 Z`.
pub fn closed_path(shape: (usize, usize), path: &str) -> Result<RegionMask> {
    let vertices = parse_path(path)?;
    Ok(polygon_mask(shape, &vertices))
}

/// A region as drawn on, or saved from, the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum RegionSpec {
    Circle {
        center_x: f64,
        center_y: f64,
        radius: f64,
    },
    Sector {
        center_x: f64,
        center_y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    AnnularSector {
        center_x: f64,
        center_y: f64,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    ClosedPath {
        path: String,
    },
    RectangleSector {
        center_x: f64,
        center_y: f64,
        side1: f64,
        side2: f64,
        start_angle: f64,
        end_angle: f64,
    },
}

impl RegionSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            RegionSpec::Circle { .. } => "circle",
            RegionSpec::Sector { .. } => "sector",
            RegionSpec::AnnularSector { .. } => "annular_sector",
            RegionSpec::ClosedPath { .. } => "closed_path",
            RegionSpec::RectangleSector { .. } => "rectangle_sector",
        }
    }
}

/// Builds the mask `spec` describes for a plane of `shape`.
pub fn build_mask(spec: &RegionSpec, shape: (usize, usize)) -> Result<RegionMask> {
    let mask = match *spec {
        RegionSpec::Circle { center_x, center_y, radius } => circle(shape, center_x, center_y, radius),
        RegionSpec::Sector {
            center_x,
            center_y,
            radius,
            start_angle,
            end_angle,
        } => sector(shape, center_x, center_y, radius, start_angle, end_angle),
        RegionSpec::AnnularSector {
            center_x,
            center_y,
            inner_radius,
            outer_radius,
            start_angle,
            end_angle,
        } => annular_sector(
            shape,
            center_x,
            center_y,
            inner_radius,
            outer_radius,
            start_angle,
            end_angle,
        ),
        RegionSpec::ClosedPath { ref path } => closed_path(shape, path),
        RegionSpec::RectangleSector {
            center_x,
            center_y,
            side1,
            side2,
            start_angle,
            end_angle,
        } => rectangle_sector(shape, center_x, center_y, side1, side2, start_angle, end_angle),
    }?;
    debug!(
        "Built {} mask with {} pixels",
        spec.kind(),
        mask.iter().filter(|&&v| v).count()
    );
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: (usize, usize) = (31, 41);

    #[test]
    fn full_span_sector_is_a_disk() {
        let disk = circle(SHAPE, 20.0, 15.0, 9.5).unwrap();
        assert_eq!(sector(SHAPE, 20.0, 15.0, 9.5, -180.0, 180.0).unwrap(), disk);
        assert_eq!(sector(SHAPE, 20.0, 15.0, 9.5, 0.0, 360.0).unwrap(), disk);
        assert!(disk[[15, 20]]);
        assert!(!disk[[15, 30]]);
    }

    #[test]
    fn full_span_annulus_is_a_disk_difference() {
        let annulus = annular_sector(SHAPE, 20.0, 15.0, 4.0, 12.0, -180.0, 180.0).unwrap();
        let outer = circle(SHAPE, 20.0, 15.0, 12.0).unwrap();
        let inner = circle(SHAPE, 20.0, 15.0, 4.0).unwrap();
        let expected = ndarray::Zip::from(&outer)
            .and(&inner)
            .map_collect(|&o, &i| o && !i);
        assert_eq!(annulus, expected);
        assert!(annulus[[15, 24]]);
        assert!(!annulus[[15, 23]]);
        // exactly on the outer radius
        assert!(!annulus[[15, 32]]);
        assert!(annulus[[15, 31]]);
    }

    #[test]
    fn full_span_rectangle_sector_is_the_rectangle() {
        let mask = rectangle_sector(SHAPE, 20.0, 15.0, 11.0, 7.0, -180.0, 180.0).unwrap();
        let expected = Array2::from_shape_fn(SHAPE, |(y, x)| {
            (x as f64 - 20.0).abs() < 5.5 && (y as f64 - 15.0).abs() < 3.5
        });
        assert_eq!(mask, expected);
    }

    #[test]
    fn half_disk_sector() {
        let mask = sector(SHAPE, 20.5, 15.0, 8.0, -90.0, 90.0).unwrap();
        for ((y, x), &inside) in mask.indexed_iter() {
            let in_disk = squared_distance(x, y, 20.5, 15.0) < 64.0;
            assert_eq!(inside, in_disk && x > 20, "pixel ({}, {})", x, y);
        }
    }

    #[test]
    fn wrapping_sector_covers_the_left_side() {
        let left = sector(SHAPE, 20.0, 15.0, 8.0, 135.0, -135.0).unwrap();
        assert!(left[[15, 14]]);
        assert!(!left[[15, 26]]);
        assert!(!left[[9, 20]]);
    }

    #[test]
    fn invalid_radii_are_out_of_range() {
        for (inner, outer) in [(0.0, 5.0), (-1.0, 5.0), (5.0, 5.0), (6.0, 5.0), (1.0, f64::NAN)] {
            assert!(matches!(
                annular_sector(SHAPE, 0.0, 0.0, inner, outer, 0.0, 90.0),
                Err(GonetError::OutOfRange(_))
            ));
        }
        assert!(matches!(
            sector(SHAPE, 0.0, 0.0, 0.0, 0.0, 90.0),
            Err(GonetError::OutOfRange(_))
        ));
    }

    #[test]
    fn region_spec_from_json() {
        let spec: RegionSpec = serde_json::from_str(
            r#"{"shape": "annular_sector", "center_x": 20, "center_y": 15,
                "inner_radius": 4, "outer_radius": 12, "start_angle": -180, "end_angle": 180}"#,
        )
        .unwrap();
        assert_eq!(spec.kind(), "annular_sector");
        assert_eq!(
            build_mask(&spec, SHAPE).unwrap(),
            annular_sector(SHAPE, 20.0, 15.0, 4.0, 12.0, -180.0, 180.0).unwrap()
        );

        let path: RegionSpec =
            serde_json::from_str(r#"{"shape": "closed_path", "path": "M1,1L9,1L9,9Z"}"#).unwrap();
        assert!(build_mask(&path, SHAPE).unwrap()[[2, 6]]);

        assert!(serde_json::from_str::<RegionSpec>(r#"{"shape": "hexagon"}"#).is_err());
    }
}
