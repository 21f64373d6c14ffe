//! Maximal common crop: the largest axis-aligned rectangle inside every
//! aligned frame, found by a genetic search over integer rectangles.

pub mod chromosome;
pub mod population;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    DEFAULT_CROSSOVER_RATE, DEFAULT_MAX_GENERATIONS, DEFAULT_MUTATION_ATTEMPTS,
    DEFAULT_MUTATION_RATE, DEFAULT_POPULATION_SIZE, DEFAULT_STAGNATION_LIMIT,
};
use crate::geometry::{Polygon, Quad, Rect};
use crate::pipeline::CancelToken;

pub use chromosome::{Chromosome, GeneRanges};
pub use population::{Operators, Population, Scored};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub population_size: usize,
    pub max_generations: usize,
    /// Stop once the best rectangle is unchanged for more than this many
    /// consecutive generations.
    pub stagnation_limit: usize,
    pub mutation_attempts: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    /// Fixed RNG seed; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            max_generations: DEFAULT_MAX_GENERATIONS,
            stagnation_limit: DEFAULT_STAGNATION_LIMIT,
            mutation_attempts: DEFAULT_MUTATION_ATTEMPTS,
            crossover_rate: DEFAULT_CROSSOVER_RATE,
            mutation_rate: DEFAULT_MUTATION_RATE,
            seed: None,
        }
    }
}

/// Intersection of all quads. `None` when there are no quads or the
/// intersection has no interior.
pub fn limiting_polygon(quads: &[Quad]) -> Option<Polygon> {
    let (first, rest) = quads.split_first()?;
    let mut polygon = first.to_polygon();
    if !polygon.is_convex() {
        polygon = polygon.convex_hull();
    }
    for quad in rest {
        polygon = polygon.clip(&quad.to_polygon());
        if polygon.is_empty() {
            return None;
        }
    }
    (!polygon.is_empty()).then_some(polygon)
}

/// Grow a rectangle from the polygon centroid, pushing each side outward one
/// pixel per round until every side is blocked.
pub fn greedy_seed(polygon: &Polygon) -> Option<Chromosome> {
    let c = polygon.centroid()?;
    let (x, y) = (c.x.floor() as i64, c.y.floor() as i64);
    let mut best = [(0, 0), (-1, 0), (0, -1), (-1, -1)]
        .iter()
        .map(|&(dx, dy)| Chromosome::new(x + dx, x + dx + 1, y + dy, y + dy + 1))
        .find(|c| c.is_feasible(polygon))?;

    const OUTWARD: [i64; 4] = [-1, 1, -1, 1];
    let mut blocked = [false; 4];
    while !blocked.iter().all(|&b| b) {
        for gene in 0..4 {
            if blocked[gene] {
                continue;
            }
            let mut candidate = best;
            candidate.genes[gene] += OUTWARD[gene];
            if candidate.is_feasible(polygon) {
                best = candidate;
            } else {
                blocked[gene] = true;
            }
        }
    }
    Some(best)
}

/// Counts consecutive generations whose leading chromosome kept the same
/// coordinates. A new leader of equal area still counts as progress.
struct Stagnation {
    leader: Chromosome,
    unchanged: usize,
}

impl Stagnation {
    fn new(leader: Chromosome) -> Self {
        Self {
            leader,
            unchanged: 0,
        }
    }

    fn observe(&mut self, leader: Chromosome) {
        if leader == self.leader {
            self.unchanged += 1;
        } else {
            self.leader = leader;
            self.unchanged = 0;
        }
    }
}

/// Genetic search for the largest feasible rectangle inside `polygon`.
///
/// Returns the best rectangle ever evaluated, or `None` if none had positive
/// area. Cancellation between generations returns the best found so far.
pub fn optimize_in_polygon(
    polygon: &Polygon,
    config: &OptimizerConfig,
    cancel: &CancelToken,
) -> Option<Rect> {
    let bounds = polygon.bounds()?;
    let ranges = GeneRanges::from_bounds(&bounds);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let seeds: Vec<Chromosome> = greedy_seed(polygon).into_iter().collect();
    let mut population = Population::new(
        config.population_size,
        &seeds,
        polygon,
        ranges,
        &mut rng,
    );
    let ops = Operators {
        crossover_rate: config.crossover_rate,
        mutation_rate: config.mutation_rate,
        mutation_attempts: config.mutation_attempts,
    };

    let mut best = population.best()?;
    let mut stagnation = Stagnation::new(best.chromosome);
    let mut generations = 0;
    while generations < config.max_generations && stagnation.unchanged <= config.stagnation_limit {
        if cancel.is_cancelled() {
            debug!(generations, "Crop search cancelled");
            break;
        }
        population.run_epoch(&ops, &mut rng);
        generations += 1;

        let Some(candidate) = population.best() else {
            break;
        };
        stagnation.observe(candidate.chromosome);
        if candidate.fitness > best.fitness {
            best = candidate;
        }
    }

    debug!(
        generations,
        area = best.fitness,
        seeded = !seeds.is_empty(),
        "Crop search finished"
    );
    (best.fitness > 0.0).then(|| best.chromosome.to_rect())
}

/// Largest axis-aligned rectangle inside every quad.
pub fn optimize_valid_rect(
    quads: &[Quad],
    config: &OptimizerConfig,
    cancel: &CancelToken,
) -> Option<Rect> {
    let polygon = limiting_polygon(quads)?;
    optimize_in_polygon(&polygon, config, cancel)
}
