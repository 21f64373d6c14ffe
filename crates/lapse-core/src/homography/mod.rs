//! Perspective transforms between frames.
//!
//! - [`dlt`]: direct linear transform from four or more correspondences.
//! - [`ransac`]: a single outlier-robust RANSAC fit.
//! - [`trials`]: repeated RANSAC runs ranked by inlier support and
//!   displacement-direction consistency.

pub mod dlt;
pub mod ransac;
pub mod trials;

use nalgebra::{Matrix3, Vector3};

use crate::geometry::{Point, Quad};

pub use ransac::{estimate_homography, RansacConfig, RansacFit};
pub use trials::{direction_variance, select_best_homography, TrialResult};

/// A 3x3 projective transform.
///
/// A fitted homography maps base (reference) image coordinates to target
/// image coordinates; its [`inverse`](Self::inverse) maps a target frame
/// into the reference frame's composite space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub matrix: Matrix3<f64>,
}

impl Homography {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Wrap a matrix, scaling it so `h[2][2] == 1` where possible.
    pub fn from_matrix(matrix: Matrix3<f64>) -> Self {
        let scale = matrix[(2, 2)];
        if scale.abs() > 1e-15 {
            Self {
                matrix: matrix / scale,
            }
        } else {
            Self { matrix }
        }
    }

    /// Row-major 3x3 coefficients.
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self::from_matrix(Matrix3::new(
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ))
    }

    pub fn to_rows(&self) -> [[f64; 3]; 3] {
        let m = &self.matrix;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    /// Project a point: `H * [x, y, 1]^T` dehomogenized.
    /// Points mapped to infinity come back as NaN.
    pub fn project(&self, p: Point) -> Point {
        let v = self.matrix * Vector3::new(p.x, p.y, 1.0);
        if v[2].abs() < 1e-15 {
            return Point::new(f64::NAN, f64::NAN);
        }
        Point::new(v[0] / v[2], v[1] / v[2])
    }

    pub fn project_quad(&self, quad: &Quad) -> Quad {
        Quad::new(quad.corners.map(|p| self.project(p)))
    }

    pub fn inverse(&self) -> Option<Homography> {
        self.matrix
            .try_inverse()
            .filter(|m| m.iter().all(|v| v.is_finite()))
            .map(Homography::from_matrix)
    }

    /// Composition `self ∘ other`: apply `other` first.
    pub fn compose(&self, other: &Homography) -> Homography {
        Homography::from_matrix(self.matrix * other.matrix)
    }

    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}
