use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;

use crate::geometry::Polygon;

use super::chromosome::{Chromosome, GeneRanges};

/// A chromosome with its cached fitness.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scored {
    pub chromosome: Chromosome,
    pub fitness: f64,
}

impl Scored {
    pub fn evaluate(chromosome: Chromosome, polygon: &Polygon) -> Self {
        Self {
            chromosome,
            fitness: chromosome.fitness(polygon),
        }
    }
}

/// Genetic operator settings for one search.
#[derive(Clone, Copy, Debug)]
pub struct Operators {
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub mutation_attempts: usize,
}

/// Fixed-size population evolved by crossover, mutation and rank selection.
pub struct Population<'a> {
    members: Vec<Scored>,
    size: usize,
    polygon: &'a Polygon,
    ranges: GeneRanges,
}

impl<'a> Population<'a> {
    /// `seeds` are inserted first; the remainder is sampled from `ranges`.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        seeds: &[Chromosome],
        polygon: &'a Polygon,
        ranges: GeneRanges,
        rng: &mut R,
    ) -> Self {
        let size = size.max(2);
        let mut members: Vec<Scored> = seeds
            .iter()
            .take(size)
            .map(|&c| Scored::evaluate(c, polygon))
            .collect();
        while members.len() < size {
            members.push(Scored::evaluate(ranges.random(rng), polygon));
        }
        Self {
            members,
            size,
            polygon,
            ranges,
        }
    }

    pub fn members(&self) -> &[Scored] {
        &self.members
    }

    /// Fittest member; earlier members win ties.
    pub fn best(&self) -> Option<Scored> {
        self.members
            .iter()
            .copied()
            .reduce(|best, m| if m.fitness > best.fitness { m } else { best })
    }

    /// One generation: offspring are appended, then rank selection trims the
    /// population back to its size.
    pub fn run_epoch<R: Rng + ?Sized>(&mut self, ops: &Operators, rng: &mut R) {
        let n = self.members.len();
        let crossover_rate = ops.crossover_rate.clamp(0.0, 1.0);
        let mutation_rate = ops.mutation_rate.clamp(0.0, 1.0);

        for i in (1..n).step_by(2) {
            if rng.gen_bool(crossover_rate) {
                let point = rng.gen_range(1..4);
                let (a, b) = self.members[i - 1]
                    .chromosome
                    .crossover(&self.members[i].chromosome, point);
                self.members.push(Scored::evaluate(a, self.polygon));
                self.members.push(Scored::evaluate(b, self.polygon));
            }
        }

        for i in 0..n {
            if rng.gen_bool(mutation_rate) {
                let mut child = self.members[i].chromosome;
                child.mutate(&self.ranges, self.polygon, ops.mutation_attempts, rng);
                self.members.push(Scored::evaluate(child, self.polygon));
            }
        }

        self.select(rng);
    }

    /// Rank selection: sort by fitness and draw with weight `count - rank`.
    fn select<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.members.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        let count = self.members.len();
        let Ok(dist) = WeightedIndex::new((0..count).map(|rank| count - rank)) else {
            self.members.truncate(self.size);
            return;
        };
        let selected: Vec<Scored> = (0..self.size)
            .map(|_| self.members[dist.sample(rng)])
            .collect();
        self.members = selected;
    }
}
