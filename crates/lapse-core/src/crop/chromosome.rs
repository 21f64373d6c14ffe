use rand::Rng;

use crate::geometry::{Point, Polygon, Rect};

/// Gene positions within a chromosome.
pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;
pub const TOP: usize = 2;
pub const BOTTOM: usize = 3;

/// A candidate crop: integer `[left, right, top, bottom]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Chromosome {
    pub genes: [i64; 4],
}

impl Chromosome {
    pub const fn new(left: i64, right: i64, top: i64, bottom: i64) -> Self {
        Self {
            genes: [left, right, top, bottom],
        }
    }

    pub fn left(&self) -> i64 {
        self.genes[LEFT]
    }

    pub fn right(&self) -> i64 {
        self.genes[RIGHT]
    }

    pub fn top(&self) -> i64 {
        self.genes[TOP]
    }

    pub fn bottom(&self) -> i64 {
        self.genes[BOTTOM]
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_edges(
            self.left() as f64,
            self.top() as f64,
            self.right() as f64,
            self.bottom() as f64,
        )
    }

    fn corner(&self, x_gene: usize, y_gene: usize) -> Point {
        Point::new(self.genes[x_gene] as f64, self.genes[y_gene] as f64)
    }

    /// Every corner inside `polygon` (boundary included).
    pub fn is_feasible(&self, polygon: &Polygon) -> bool {
        [(LEFT, TOP), (LEFT, BOTTOM), (RIGHT, BOTTOM), (RIGHT, TOP)]
            .iter()
            .all(|&(x, y)| polygon.contains(self.corner(x, y)))
    }

    /// The two corners that share `gene` are inside `polygon`.
    fn gene_feasible(&self, gene: usize, polygon: &Polygon) -> bool {
        let pair = match gene {
            LEFT => [(LEFT, TOP), (LEFT, BOTTOM)],
            RIGHT => [(RIGHT, TOP), (RIGHT, BOTTOM)],
            TOP => [(LEFT, TOP), (RIGHT, TOP)],
            _ => [(LEFT, BOTTOM), (RIGHT, BOTTOM)],
        };
        pair.iter()
            .all(|&(x, y)| polygon.contains(self.corner(x, y)))
    }

    /// Area when feasible and non-degenerate, else 0.
    pub fn fitness(&self, polygon: &Polygon) -> f64 {
        let width = self.right() - self.left();
        let height = self.bottom() - self.top();
        if width <= 0 || height <= 0 || !self.is_feasible(polygon) {
            return 0.0;
        }
        (width * height) as f64
    }

    /// Single-point crossover: genes before `point` come from `self`, the
    /// rest from `other`, and the mirror child.
    pub fn crossover(&self, other: &Chromosome, point: usize) -> (Chromosome, Chromosome) {
        let mut a = self.genes;
        let mut b = other.genes;
        let point = point.min(4);
        for (x, y) in a[point..].iter_mut().zip(b[point..].iter_mut()) {
            std::mem::swap(x, y);
        }
        (Chromosome { genes: a }, Chromosome { genes: b })
    }

    /// Resample one random gene within its range until the corners sharing
    /// it are inside `polygon`, giving up after `attempts` draws and keeping
    /// the last value.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        ranges: &GeneRanges,
        polygon: &Polygon,
        attempts: usize,
        rng: &mut R,
    ) {
        let gene = rng.gen_range(0..4);
        for _ in 0..attempts.max(1) {
            self.genes[gene] = ranges.sample(gene, rng);
            if self.gene_feasible(gene, polygon) {
                break;
            }
        }
    }
}

/// Half-open sampling range per gene. `left`/`top` come from the low half of
/// the polygon's bounding box, `right`/`bottom` from the high half.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneRanges {
    pub ranges: [(i64, i64); 4],
}

impl GeneRanges {
    pub fn from_bounds(bounds: &Rect) -> Self {
        let mid_x = bounds.left() + bounds.width / 2.0;
        let mid_y = bounds.top() + bounds.height / 2.0;
        Self {
            ranges: [
                (bounds.left().ceil() as i64, mid_x.floor() as i64),
                (mid_x.ceil() as i64, bounds.right().floor() as i64),
                (bounds.top().ceil() as i64, mid_y.floor() as i64),
                (mid_y.ceil() as i64, bounds.bottom().floor() as i64),
            ],
        }
    }

    /// Uniform draw from `[lo, hi)`; an empty range yields `lo`.
    pub fn sample<R: Rng + ?Sized>(&self, gene: usize, rng: &mut R) -> i64 {
        let (lo, hi) = self.ranges[gene];
        if lo < hi {
            rng.gen_range(lo..hi)
        } else {
            lo
        }
    }

    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Chromosome {
        Chromosome {
            genes: std::array::from_fn(|gene| self.sample(gene, rng)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square() -> Polygon {
        Rect::new(0.0, 0.0, 100.0, 100.0).to_quad().to_polygon()
    }

    #[test]
    fn test_fitness_inside_and_outside() {
        let poly = square();
        assert_eq!(Chromosome::new(10, 60, 20, 40).fitness(&poly), 1000.0);
        assert_eq!(Chromosome::new(0, 100, 0, 100).fitness(&poly), 10_000.0);
        assert_eq!(Chromosome::new(-1, 50, 0, 50).fitness(&poly), 0.0);
        assert_eq!(Chromosome::new(50, 40, 0, 50).fitness(&poly), 0.0);
    }

    #[test]
    fn test_crossover_point() {
        let a = Chromosome::new(1, 2, 3, 4);
        let b = Chromosome::new(5, 6, 7, 8);
        let (c, d) = a.crossover(&b, 2);
        assert_eq!(c, Chromosome::new(1, 2, 7, 8));
        assert_eq!(d, Chromosome::new(5, 6, 3, 4));
    }

    #[test]
    fn test_ranges_split_at_midline() {
        let ranges = GeneRanges::from_bounds(&Rect::new(0.5, 10.0, 99.0, 50.0));
        assert_eq!(ranges.ranges[LEFT], (1, 50));
        assert_eq!(ranges.ranges[RIGHT], (50, 99));
        assert_eq!(ranges.ranges[TOP], (10, 35));
        assert_eq!(ranges.ranges[BOTTOM], (35, 60));
    }

    #[test]
    fn test_empty_range_yields_lower_bound() {
        let ranges = GeneRanges {
            ranges: [(5, 5), (7, 3), (0, 1), (2, 2)],
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(ranges.random(&mut rng), Chromosome::new(5, 7, 0, 2));
    }

    #[test]
    fn test_random_within_ranges() {
        let ranges = GeneRanges::from_bounds(&Rect::new(0.0, 0.0, 100.0, 80.0));
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let c = ranges.random(&mut rng);
            assert!((0..50).contains(&c.left()));
            assert!((50..100).contains(&c.right()));
            assert!((0..40).contains(&c.top()));
            assert!((40..80).contains(&c.bottom()));
        }
    }

    #[test]
    fn test_mutation_stays_feasible_in_square() {
        let poly = square();
        let ranges = GeneRanges::from_bounds(&Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut rng = StdRng::seed_from_u64(9);
        let mut c = Chromosome::new(10, 60, 20, 70);
        for _ in 0..50 {
            c.mutate(&ranges, &poly, 100, &mut rng);
            assert!(c.is_feasible(&poly));
        }
    }
}
