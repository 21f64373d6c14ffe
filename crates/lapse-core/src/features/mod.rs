//! Point correspondences between two images.
//!
//! The aligner only depends on [`CorrespondenceProvider`]; the shipped
//! [`CorrelationMatcher`] pairs Harris corners by normalized cross-correlation.

pub mod corners;
pub mod matching;

use crate::error::{LapseError, Result};
use crate::frame::Plane;
use crate::geometry::Point;

pub use corners::{detect_corners, Corner};
pub use matching::{CorrelationMatcher, MatchingConfig};

/// Index-paired points: `base()[i]` matches `target()[i]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Correspondences {
    base: Vec<Point>,
    target: Vec<Point>,
}

impl Correspondences {
    pub fn new(base: Vec<Point>, target: Vec<Point>) -> Result<Self> {
        if base.len() != target.len() {
            return Err(LapseError::MismatchedCorrespondences {
                base: base.len(),
                target: target.len(),
            });
        }
        Ok(Self { base, target })
    }

    pub fn base(&self) -> &[Point] {
        &self.base
    }

    pub fn target(&self) -> &[Point] {
        &self.target
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Rescale both point sets per axis, e.g. from preprocessed to original
    /// resolution. Factors are `(sx, sy)` for base and target respectively.
    pub fn scaled(&self, base: (f64, f64), target: (f64, f64)) -> Self {
        let scale = |pts: &[Point], (sx, sy): (f64, f64)| -> Vec<Point> {
            pts.iter().map(|p| Point::new(p.x * sx, p.y * sy)).collect()
        };
        Self {
            base: scale(&self.base, base),
            target: scale(&self.target, target),
        }
    }
}

/// Source of matched points between a base and a target image.
///
/// Points are returned in each image's own pixel space.
pub trait CorrespondenceProvider: Send + Sync {
    fn correspondences(&self, base: &Plane, target: &Plane) -> Result<Correspondences>;
}
