//! Elementwise arithmetic on [`GonetImage`].
//!
//! Every operation goes through [`GonetImage::combine`], which applies a
//! [`BinaryOp`] to each plane against either another image or a scalar.
//! Image-image results drop metadata and provenance (two provenances have no
//! defined merge); image-scalar results keep both. Division follows IEEE
//! semantics: dividing by zero yields `inf` or `NaN`, not an error.

use ndarray::{Array2, Zip};

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::gonet_image::image::GonetImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => a / b,
        }
    }
}

/// Right-hand side of an image operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Image(&'a GonetImage),
    Scalar(f64),
}

impl<'a> From<&'a GonetImage> for Operand<'a> {
    fn from(image: &'a GonetImage) -> Self {
        Operand::Image(image)
    }
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl From<i32> for Operand<'_> {
    fn from(value: i32) -> Self {
        Operand::Scalar(value as f64)
    }
}

impl GonetImage {
    pub fn add<'a>(&self, other: impl Into<Operand<'a>>) -> Result<GonetImage> {
        self.combine(other.into(), BinaryOp::Add)
    }

    pub fn subtract<'a>(&self, other: impl Into<Operand<'a>>) -> Result<GonetImage> {
        self.combine(other.into(), BinaryOp::Subtract)
    }

    pub fn multiply<'a>(&self, other: impl Into<Operand<'a>>) -> Result<GonetImage> {
        self.combine(other.into(), BinaryOp::Multiply)
    }

    pub fn divide<'a>(&self, other: impl Into<Operand<'a>>) -> Result<GonetImage> {
        self.combine(other.into(), BinaryOp::Divide)
    }

    /// In-place addition. Adding another image clears metadata and
    /// provenance, like [`GonetImage::add`].
    pub fn add_assign<'a>(&mut self, other: impl Into<Operand<'a>>) -> Result<()> {
        match other.into() {
            Operand::Image(rhs) => {
                self.check_shape(rhs)?;
                accumulate(&mut self.red, &rhs.red);
                accumulate(&mut self.green, &rhs.green);
                accumulate(&mut self.blue, &rhs.blue);
                self.metadata = None;
                self.provenance = None;
            }
            Operand::Scalar(k) => {
                self.red.mapv_inplace(|v| v + k);
                self.green.mapv_inplace(|v| v + k);
                self.blue.mapv_inplace(|v| v + k);
            }
        }
        Ok(())
    }

    fn combine(&self, other: Operand<'_>, op: BinaryOp) -> Result<GonetImage> {
        match other {
            Operand::Image(rhs) => {
                self.check_shape(rhs)?;
                GonetImage::new(
                    zip_planes(&self.red, &rhs.red, op),
                    zip_planes(&self.green, &rhs.green, op),
                    zip_planes(&self.blue, &rhs.blue, op),
                    None,
                    None,
                )
            }
            Operand::Scalar(k) => GonetImage::new(
                self.red.mapv(|v| op.apply(v, k)),
                self.green.mapv(|v| op.apply(v, k)),
                self.blue.mapv(|v| op.apply(v, k)),
                self.metadata.clone(),
                self.provenance.clone(),
            ),
        }
    }

    fn check_shape(&self, other: &GonetImage) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(GonetError::InvalidArgument(format!(
                "cannot combine images of shape {:?} and {:?}",
                self.shape(),
                other.shape()
            )));
        }
        Ok(())
    }
}

fn zip_planes(a: &Array2<f64>, b: &Array2<f64>, op: BinaryOp) -> Array2<f64> {
    Zip::from(a).and(b).map_collect(|&x, &y| op.apply(x, y))
}

fn accumulate(target: &mut Array2<f64>, rhs: &Array2<f64>) {
    Zip::from(target).and(rhs).for_each(|t, &r| *t += r);
}
