use crate::consts::GEOMETRY_EPSILON;

use super::{Point, Rect};

/// A simple polygon given by its vertices in order (either winding).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Shoelace area, positive for counter-clockwise winding in y-up terms.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        sum / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// A polygon without interior: fewer than three vertices or zero area.
    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3 || self.area() <= GEOMETRY_EPSILON
    }

    pub fn bounds(&self) -> Option<Rect> {
        Rect::from_points(&self.vertices)
    }

    /// Area centroid. Falls back to the vertex mean for degenerate polygons.
    pub fn centroid(&self) -> Option<Point> {
        let n = self.vertices.len();
        if n == 0 {
            return None;
        }
        let a = self.signed_area();
        if a.abs() <= GEOMETRY_EPSILON {
            let sx: f64 = self.vertices.iter().map(|p| p.x).sum();
            let sy: f64 = self.vertices.iter().map(|p| p.y).sum();
            return Some(Point::new(sx / n as f64, sy / n as f64));
        }
        let (mut cx, mut cy) = (0.0, 0.0);
        for i in 0..n {
            let p = self.vertices[i];
            let q = self.vertices[(i + 1) % n];
            let cross = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * cross;
            cy += (p.y + q.y) * cross;
        }
        Some(Point::new(cx / (6.0 * a), cy / (6.0 * a)))
    }

    /// Point containment; points on an edge count as inside.
    pub fn contains(&self, p: Point) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        for i in 0..n {
            if on_segment(self.vertices[i], self.vertices[(i + 1) % n], p) {
                return true;
            }
        }

        // Even-odd ray cast towards +x.
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut sign = 0.0f64;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let c = self.vertices[(i + 2) % n];
            let turn = cross(a, b, c);
            if turn.abs() <= GEOMETRY_EPSILON {
                continue;
            }
            if sign == 0.0 {
                sign = turn.signum();
            } else if turn.signum() != sign {
                return false;
            }
        }
        sign != 0.0
    }

    /// Convex hull (Andrew's monotone chain).
    pub fn convex_hull(&self) -> Polygon {
        let mut pts = self.vertices.clone();
        pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        pts.dedup();
        if pts.len() < 3 {
            return Polygon::new(pts);
        }

        let mut lower: Vec<Point> = Vec::with_capacity(pts.len());
        for &p in &pts {
            while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0
            {
                lower.pop();
            }
            lower.push(p);
        }
        let mut upper: Vec<Point> = Vec::with_capacity(pts.len());
        for &p in pts.iter().rev() {
            while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0
            {
                upper.pop();
            }
            upper.push(p);
        }
        lower.pop();
        upper.pop();
        lower.extend(upper);
        Polygon::new(lower)
    }

    /// Intersection of `self` with the convex polygon `clip` (Sutherland-Hodgman).
    ///
    /// A non-convex `clip` is replaced by its convex hull. The result is empty
    /// when the polygons do not overlap.
    pub fn clip(&self, clip: &Polygon) -> Polygon {
        let clip = if clip.is_convex() {
            clip.clone()
        } else {
            clip.convex_hull()
        };
        if clip.is_empty() || self.is_empty() {
            return Polygon::default();
        }

        let orientation = clip.signed_area().signum();
        let m = clip.vertices.len();
        let mut output = self.vertices.clone();

        for i in 0..m {
            if output.is_empty() {
                break;
            }
            let a = clip.vertices[i];
            let b = clip.vertices[(i + 1) % m];
            let inside = |p: Point| orientation * cross(a, b, p) >= -GEOMETRY_EPSILON;

            let input = std::mem::take(&mut output);
            let mut prev = input[input.len() - 1];
            for &curr in &input {
                match (inside(curr), inside(prev)) {
                    (true, true) => output.push(curr),
                    (true, false) => {
                        if let Some(x) = line_intersection(prev, curr, a, b) {
                            output.push(x);
                        }
                        output.push(curr);
                    }
                    (false, true) => {
                        if let Some(x) = line_intersection(prev, curr, a, b) {
                            output.push(x);
                        }
                    }
                    (false, false) => {}
                }
                prev = curr;
            }
        }

        output.dedup_by(|a, b| a.distance(b) <= GEOMETRY_EPSILON);
        if output.len() > 1 && output[0].distance(&output[output.len() - 1]) <= GEOMETRY_EPSILON {
            output.pop();
        }
        let result = Polygon::new(output);
        if result.is_empty() {
            Polygon::default()
        } else {
            result
        }
    }
}

/// Z component of `(b - a) x (c - a)`.
fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    let len = a.distance(&b);
    if len <= GEOMETRY_EPSILON {
        return a.distance(&p) <= GEOMETRY_EPSILON;
    }
    if (cross(a, b, p) / len).abs() > GEOMETRY_EPSILON {
        return false;
    }
    p.x >= a.x.min(b.x) - GEOMETRY_EPSILON
        && p.x <= a.x.max(b.x) + GEOMETRY_EPSILON
        && p.y >= a.y.min(b.y) - GEOMETRY_EPSILON
        && p.y <= a.y.max(b.y) + GEOMETRY_EPSILON
}

/// Intersection of segment `p→q` with the infinite line through `a`, `b`.
fn line_intersection(p: Point, q: Point, a: Point, b: Point) -> Option<Point> {
    let d1 = Point::new(q.x - p.x, q.y - p.y);
    let d2 = Point::new(b.x - a.x, b.y - a.y);
    let denom = d1.x * d2.y - d1.y * d2.x;
    if denom.abs() <= f64::EPSILON {
        return None;
    }
    let t = ((a.x - p.x) * d2.y - (a.y - p.y) * d2.x) / denom;
    Some(Point::new(p.x + t * d1.x, p.y + t * d1.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Rect::new(x, y, size, size).to_quad().to_polygon()
    }

    #[test]
    fn test_area_and_centroid() {
        let sq = square(0.0, 0.0, 10.0);
        assert_relative_eq!(sq.area(), 100.0);
        let c = sq.centroid().unwrap();
        assert_relative_eq!(c.x, 5.0);
        assert_relative_eq!(c.y, 5.0);
    }

    #[test]
    fn test_contains_boundary_and_interior() {
        let sq = square(0.0, 0.0, 10.0);
        assert!(sq.contains(Point::new(5.0, 5.0)));
        assert!(sq.contains(Point::new(0.0, 0.0)));
        assert!(sq.contains(Point::new(10.0, 4.0)));
        assert!(!sq.contains(Point::new(10.5, 4.0)));
        assert!(!sq.contains(Point::new(-0.1, -0.1)));
    }

    #[test]
    fn test_contains_triangle() {
        let tri = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        ]);
        assert!(tri.contains(Point::new(2.0, 2.0)));
        assert!(tri.contains(Point::new(5.0, 5.0)));
        assert!(!tri.contains(Point::new(6.0, 6.0)));
    }

    #[test]
    fn test_clip_overlapping_squares() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 5.0, 10.0);
        let i = a.clip(&b);
        assert_relative_eq!(i.area(), 25.0, epsilon = 1e-9);
        let b = i.bounds().unwrap();
        assert_relative_eq!(b.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(b.y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(b.right(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(b.bottom(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clip_disjoint_is_empty() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(20.0, 20.0, 5.0);
        assert!(a.clip(&b).is_empty());
    }

    #[test]
    fn test_clip_touching_edge_is_empty() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(10.0, 0.0, 10.0);
        assert!(a.clip(&b).is_empty());
    }

    #[test]
    fn test_clip_opposite_winding() {
        let a = square(0.0, 0.0, 10.0);
        let mut b = square(2.0, 2.0, 4.0);
        b.vertices.reverse();
        assert_relative_eq!(a.clip(&b).area(), 16.0, epsilon = 1e-9);
    }

    #[test]
    fn test_convex_hull_of_bowtie() {
        let bowtie = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ]);
        assert!(!bowtie.is_convex());
        let hull = bowtie.convex_hull();
        assert_eq!(hull.vertices.len(), 4);
        assert_relative_eq!(hull.area(), 100.0);
    }
}
