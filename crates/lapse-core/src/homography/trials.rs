use std::cmp::Ordering;
use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

use crate::features::Correspondences;

use super::ransac::{estimate_homography, RansacConfig};
use super::Homography;

/// Outcome of one RANSAC trial, with the scores used for ranking.
#[derive(Clone, Debug)]
pub struct TrialResult {
    pub homography: Homography,
    pub inliers: Vec<usize>,
    /// Population variance of the inlier displacement angles (radians²).
    pub direction_variance: f64,
    /// Index of the trial that produced this result.
    pub trial: usize,
}

impl TrialResult {
    pub fn inlier_count(&self) -> usize {
        self.inliers.len()
    }
}

/// Population variance of `atan2(Δy, Δx) + 2π` over the given pairs,
/// with `Δ = target − base`. Zero for an empty selection.
pub fn direction_variance(corr: &Correspondences, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let angles: Vec<f64> = indices
        .iter()
        .map(|&i| {
            let b = corr.base()[i];
            let t = corr.target()[i];
            (t.y - b.y).atan2(t.x - b.x) + TAU
        })
        .collect();
    let n = angles.len() as f64;
    let mean = angles.iter().sum::<f64>() / n;
    angles.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n
}

/// More inliers first, then lower direction variance, then lower trial index.
pub fn compare_trials(a: &TrialResult, b: &TrialResult) -> Ordering {
    b.inlier_count()
        .cmp(&a.inlier_count())
        .then(a.direction_variance.total_cmp(&b.direction_variance))
        .then(a.trial.cmp(&b.trial))
}

/// Pick the best-ranked result, if any.
pub fn best_trial(results: Vec<TrialResult>) -> Option<TrialResult> {
    results.into_iter().min_by(compare_trials)
}

fn trial_rng(seed: Option<u64>, trial: usize) -> StdRng {
    match seed {
        Some(base) => StdRng::seed_from_u64(base.wrapping_add(trial as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Run `config.trials` independent RANSAC fits in parallel and return the
/// best one. `None` when every trial fails.
pub fn select_best_homography(
    corr: &Correspondences,
    config: &RansacConfig,
) -> Option<TrialResult> {
    let results: Vec<TrialResult> = (0..config.trials.max(1))
        .into_par_iter()
        .filter_map(|trial| {
            let mut rng = trial_rng(config.seed, trial);
            let fit = estimate_homography(corr, config, &mut rng)?;
            let direction_variance = direction_variance(corr, &fit.inliers);
            Some(TrialResult {
                homography: fit.homography,
                inliers: fit.inliers,
                direction_variance,
                trial,
            })
        })
        .collect();

    let succeeded = results.len();
    let best = best_trial(results)?;
    debug!(
        trials = config.trials,
        succeeded,
        winner = best.trial,
        inliers = best.inlier_count(),
        variance = best.direction_variance,
        "Homography trials ranked"
    );
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn result(trial: usize, inliers: usize, variance: f64) -> TrialResult {
        TrialResult {
            homography: Homography::identity(),
            inliers: (0..inliers).collect(),
            direction_variance: variance,
            trial,
        }
    }

    #[test]
    fn test_more_inliers_wins() {
        let best = best_trial(vec![result(0, 10, 0.0), result(1, 12, 5.0)]).unwrap();
        assert_eq!(best.trial, 1);
    }

    #[test]
    fn test_variance_breaks_inlier_tie() {
        let best = best_trial(vec![
            result(0, 10, 0.4),
            result(1, 10, 0.1),
            result(2, 9, 0.0),
        ])
        .unwrap();
        assert_eq!(best.trial, 1);
    }

    #[test]
    fn test_trial_index_breaks_full_tie() {
        let best = best_trial(vec![result(3, 10, 0.2), result(1, 10, 0.2)]).unwrap();
        assert_eq!(best.trial, 1);
    }

    #[test]
    fn test_empty_results() {
        assert!(best_trial(Vec::new()).is_none());
    }

    #[test]
    fn test_direction_variance_of_uniform_shift_is_zero() {
        let base: Vec<Point> = (0..5).map(|i| Point::new(i as f64 * 10.0, 3.0)).collect();
        let target: Vec<Point> = base.iter().map(|p| Point::new(p.x + 2.0, p.y + 1.0)).collect();
        let corr = Correspondences::new(base, target).unwrap();
        let v = direction_variance(&corr, &[0, 1, 2, 3, 4]);
        assert!(v.abs() < 1e-12);
        assert_eq!(direction_variance(&corr, &[]), 0.0);
    }

    #[test]
    fn test_direction_variance_of_opposite_shifts() {
        let base = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        // Angles 0 and π: variance (π/2)².
        let target = vec![Point::new(1.0, 0.0), Point::new(9.0, 0.0)];
        let corr = Correspondences::new(base, target).unwrap();
        let v = direction_variance(&corr, &[0, 1]);
        let expected = (std::f64::consts::PI / 2.0).powi(2);
        assert!((v - expected).abs() < 1e-12);
    }
}
