use serde::{Deserialize, Serialize};

use crate::crop::OptimizerConfig;
use crate::error::{LapseError, Result};
use crate::features::MatchingConfig;
use crate::homography::RansacConfig;
use crate::io::PreprocessConfig;

/// Every tunable of an alignment run. Missing TOML sections fall back to
/// their defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LapseConfig {
    #[serde(default)]
    pub preprocess: PreprocessConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub ransac: RansacConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

impl LapseConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(LapseError::Config(msg.to_string()));
        if self.preprocess.height == 0 {
            return fail("preprocess.height must be positive");
        }
        if self.matching.window_radius == 0 {
            return fail("matching.window_radius must be positive");
        }
        if self.ransac.trials == 0 || self.ransac.max_evaluations == 0 {
            return fail("ransac.trials and ransac.max_evaluations must be positive");
        }
        if self.ransac.inlier_threshold.is_nan() || self.ransac.inlier_threshold <= 0.0 {
            return fail("ransac.inlier_threshold must be positive");
        }
        if !(self.ransac.confidence > 0.0 && self.ransac.confidence < 1.0) {
            return fail("ransac.confidence must lie in (0, 1)");
        }
        if self.optimizer.population_size < 2 {
            return fail("optimizer.population_size must be at least 2");
        }
        for (name, rate) in [
            ("optimizer.crossover_rate", self.optimizer.crossover_rate),
            ("optimizer.mutation_rate", self.optimizer.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(LapseError::Config(format!("{name} must lie in [0, 1]")));
            }
        }
        Ok(())
    }
}
