use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_RANSAC_CONFIDENCE, DEFAULT_RANSAC_INLIER_THRESHOLD, DEFAULT_RANSAC_MAX_EVALUATIONS,
    DEFAULT_RANSAC_MAX_SAMPLINGS, DEFAULT_RANSAC_TRIALS, HOMOGRAPHY_SAMPLE_SIZE,
};
use crate::features::Correspondences;
use crate::geometry::Point;

use super::dlt::{fit_homography, is_degenerate_sample};
use super::Homography;

/// RANSAC and multi-trial parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacConfig {
    /// Independent RANSAC runs per frame pair.
    pub trials: usize,
    /// Upper bound on model evaluations in one run.
    pub max_evaluations: usize,
    /// Attempts to draw a usable minimal sample per evaluation.
    pub max_samplings: usize,
    /// Symmetric transfer error (pixels) below which a pair is an inlier.
    pub inlier_threshold: f64,
    /// Target probability of drawing at least one outlier-free sample.
    pub confidence: f64,
    /// Base seed; trial `i` is seeded with `seed + i`. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_RANSAC_TRIALS,
            max_evaluations: DEFAULT_RANSAC_MAX_EVALUATIONS,
            max_samplings: DEFAULT_RANSAC_MAX_SAMPLINGS,
            inlier_threshold: DEFAULT_RANSAC_INLIER_THRESHOLD,
            confidence: DEFAULT_RANSAC_CONFIDENCE,
            seed: None,
        }
    }
}

/// A RANSAC model together with the indices of its supporting pairs.
#[derive(Clone, Debug)]
pub struct RansacFit {
    pub homography: Homography,
    /// Indices into the correspondence set, ascending.
    pub inliers: Vec<usize>,
}

impl RansacFit {
    pub fn inlier_count(&self) -> usize {
        self.inliers.len()
    }
}

/// Iterations needed to draw an all-inlier sample with probability
/// `confidence`, given the current inlier ratio. Clamped to `[1, max]`.
pub fn adaptive_iterations(
    inlier_ratio: f64,
    sample_size: usize,
    confidence: f64,
    max: usize,
) -> usize {
    if inlier_ratio >= 1.0 {
        return 1;
    }
    if inlier_ratio <= 0.0 || !(0.0..1.0).contains(&confidence) {
        return max;
    }
    let all_inliers = inlier_ratio.powi(sample_size as i32);
    let denom = (1.0 - all_inliers).ln();
    if denom >= 0.0 || !denom.is_finite() {
        return max;
    }
    let n = ((1.0 - confidence).ln() / denom).ceil();
    if !n.is_finite() || n >= max as f64 {
        max
    } else {
        (n as usize).max(1)
    }
}

/// Symmetric transfer error: RMS of forward and backward reprojection.
fn transfer_error(h: &Homography, h_inv: &Homography, base: Point, target: Point) -> f64 {
    let forward = h.project(base).distance(&target);
    let backward = h_inv.project(target).distance(&base);
    ((forward * forward + backward * backward) / 2.0).sqrt()
}

fn collect_inliers(h: &Homography, corr: &Correspondences, threshold: f64) -> Vec<usize> {
    let Some(h_inv) = h.inverse() else {
        return Vec::new();
    };
    corr.base()
        .iter()
        .zip(corr.target())
        .enumerate()
        .filter(|(_, (&b, &t))| {
            let err = transfer_error(h, &h_inv, b, t);
            err.is_finite() && err < threshold
        })
        .map(|(i, _)| i)
        .collect()
}

/// Draw a non-degenerate minimal sample and fit it, retrying up to
/// `max_samplings` times.
fn sample_model<R: Rng + ?Sized>(
    corr: &Correspondences,
    max_samplings: usize,
    rng: &mut R,
) -> Option<Homography> {
    let n = corr.len();
    for _ in 0..max_samplings.max(1) {
        let idx = sample(rng, n, HOMOGRAPHY_SAMPLE_SIZE);
        let src: Vec<Point> = idx.iter().map(|i| corr.base()[i]).collect();
        let dst: Vec<Point> = idx.iter().map(|i| corr.target()[i]).collect();
        if is_degenerate_sample(&src) || is_degenerate_sample(&dst) {
            continue;
        }
        if let Some(h) = fit_homography(&src, &dst) {
            return Some(h);
        }
    }
    None
}

/// One RANSAC run fitting `H` with `target ≈ H(base)`.
///
/// Returns `None` when there are fewer than four pairs or no model gains any
/// inlier support.
pub fn estimate_homography<R: Rng + ?Sized>(
    corr: &Correspondences,
    config: &RansacConfig,
    rng: &mut R,
) -> Option<RansacFit> {
    let n = corr.len();
    if n < HOMOGRAPHY_SAMPLE_SIZE {
        return None;
    }

    let mut best: Option<RansacFit> = None;
    let mut required = config.max_evaluations;
    let mut evaluations = 0;

    while evaluations < required {
        evaluations += 1;

        let Some(h) = sample_model(corr, config.max_samplings, rng) else {
            continue;
        };
        let inliers = collect_inliers(&h, corr, config.inlier_threshold);
        let best_count = best.as_ref().map_or(0, RansacFit::inlier_count);
        if inliers.len() > best_count {
            required = adaptive_iterations(
                inliers.len() as f64 / n as f64,
                HOMOGRAPHY_SAMPLE_SIZE,
                config.confidence,
                config.max_evaluations,
            );
            best = Some(RansacFit {
                homography: h,
                inliers,
            });
        }
    }

    let best = best.filter(|fit| !fit.inliers.is_empty())?;
    Some(refit(corr, config, best))
}

/// Re-estimate on every inlier; keep the refit only if it loses no support.
fn refit(corr: &Correspondences, config: &RansacConfig, fit: RansacFit) -> RansacFit {
    if fit.inliers.len() <= HOMOGRAPHY_SAMPLE_SIZE {
        return fit;
    }
    let src: Vec<Point> = fit.inliers.iter().map(|&i| corr.base()[i]).collect();
    let dst: Vec<Point> = fit.inliers.iter().map(|&i| corr.target()[i]).collect();
    match fit_homography(&src, &dst) {
        Some(h) => {
            let inliers = collect_inliers(&h, corr, config.inlier_threshold);
            if inliers.len() >= fit.inliers.len() {
                RansacFit {
                    homography: h,
                    inliers,
                }
            } else {
                fit
            }
        }
        None => fit,
    }
}
