use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    DEFAULT_CORNER_THRESHOLD, DEFAULT_MATCH_MAX_DISTANCE, DEFAULT_MATCH_WINDOW_RADIUS,
    DEFAULT_MAX_KEYPOINTS, DEFAULT_MIN_CORRELATION, EPSILON,
};
use crate::error::{LapseError, Result};
use crate::frame::Plane;
use crate::geometry::Point;

use super::corners::{detect_corners, Corner};
use super::{CorrespondenceProvider, Correspondences};

/// Corner detection and correlation matching parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Half-size of the correlation window; the window is `2r + 1` pixels wide.
    pub window_radius: usize,
    /// Largest displacement (pixels) between a base and a target corner.
    pub max_distance: f64,
    /// Corners kept per image, strongest first.
    pub max_keypoints: usize,
    /// Corner response threshold relative to the strongest corner.
    pub corner_threshold: f32,
    /// Minimum normalized cross-correlation of an accepted match.
    pub min_correlation: f32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            window_radius: DEFAULT_MATCH_WINDOW_RADIUS,
            max_distance: DEFAULT_MATCH_MAX_DISTANCE,
            max_keypoints: DEFAULT_MAX_KEYPOINTS,
            corner_threshold: DEFAULT_CORNER_THRESHOLD,
            min_correlation: DEFAULT_MIN_CORRELATION,
        }
    }
}

/// Harris corners paired by mutual-best normalized cross-correlation.
#[derive(Clone, Debug, Default)]
pub struct CorrelationMatcher {
    pub config: MatchingConfig,
}

impl CorrelationMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }
}

/// Zero-mean, unit-norm window around a corner. `None` for flat windows.
fn descriptor(plane: &Plane, corner: &Corner, radius: usize) -> Option<Vec<f32>> {
    let window = plane.data.slice(ndarray::s![
        corner.row - radius..=corner.row + radius,
        corner.col - radius..=corner.col + radius
    ]);
    let n = window.len() as f32;
    let mean = window.sum() / n;
    let mut values: Vec<f32> = window.iter().map(|v| v - mean).collect();
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm < EPSILON {
        return None;
    }
    for v in &mut values {
        *v /= norm;
    }
    Some(values)
}

fn correlation(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

struct Keypoint {
    point: Point,
    descriptor: Vec<f32>,
}

fn keypoints(plane: &Plane, config: &MatchingConfig) -> Vec<Keypoint> {
    let radius = config.window_radius;
    detect_corners(plane, config.max_keypoints, config.corner_threshold, radius)
        .iter()
        .filter_map(|c| {
            descriptor(plane, c, radius).map(|descriptor| Keypoint {
                point: Point::new(c.col as f64, c.row as f64),
                descriptor,
            })
        })
        .collect()
}

/// Best-scoring partner `(index, score)` per base keypoint, restricted to
/// candidates within `max_distance`.
fn best_partners(
    from: &[Keypoint],
    to: &[Keypoint],
    max_distance: f64,
) -> Vec<Option<(usize, f32)>> {
    from.par_iter()
        .map(|a| {
            to.iter()
                .enumerate()
                .filter(|(_, b)| a.point.distance(&b.point) <= max_distance)
                .map(|(j, b)| (j, correlation(&a.descriptor, &b.descriptor)))
                .fold(None, |best: Option<(usize, f32)>, (j, score)| match best {
                    Some((_, s)) if s >= score => best,
                    _ => Some((j, score)),
                })
        })
        .collect()
}

impl CorrespondenceProvider for CorrelationMatcher {
    fn correspondences(&self, base: &Plane, target: &Plane) -> Result<Correspondences> {
        for plane in [base, target] {
            if plane.width() == 0 || plane.height() == 0 {
                return Err(LapseError::InvalidDimensions {
                    width: plane.width() as u32,
                    height: plane.height() as u32,
                });
            }
        }

        let base_kp = keypoints(base, &self.config);
        let target_kp = keypoints(target, &self.config);

        let forward = best_partners(&base_kp, &target_kp, self.config.max_distance);
        let backward = best_partners(&target_kp, &base_kp, self.config.max_distance);

        let (mut base_pts, mut target_pts) = (Vec::new(), Vec::new());
        for (i, partner) in forward.iter().enumerate() {
            let Some((j, score)) = *partner else { continue };
            let mutual = matches!(backward[j], Some((back, _)) if back == i);
            if mutual && score >= self.config.min_correlation {
                base_pts.push(base_kp[i].point);
                target_pts.push(target_kp[j].point);
            }
        }

        debug!(
            base_corners = base_kp.len(),
            target_corners = target_kp.len(),
            matches = base_pts.len(),
            "Correlation matching complete"
        );
        Correspondences::new(base_pts, target_pts)
    }
}
