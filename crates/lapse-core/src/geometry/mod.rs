//! Plane geometry used by the aligner and the crop search.
//!
//! Coordinates are in pixels with the origin at the top-left corner and the
//! y axis pointing down, matching image row/column order.

pub mod polygon;

use serde::{Deserialize, Serialize};

pub use polygon::Polygon;

/// A 2D point in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle, `(x, y)` being the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning `(0, 0)` to `(width, height)`.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    /// Rectangle from its edge coordinates.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Smallest rectangle enclosing every point. `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::from_edges(min_x, min_y, max_x, max_y))
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// True when `other` lies entirely inside `self` (edges may touch).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Corners ordered top-left, bottom-left, bottom-right, top-right.
    pub fn to_quad(&self) -> Quad {
        Quad::new([
            Point::new(self.left(), self.top()),
            Point::new(self.left(), self.bottom()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.right(), self.top()),
        ])
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.1}x{:.1} at ({:.1}, {:.1})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Four corners of a frame, ordered top-left, bottom-left, bottom-right, top-right.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    pub const fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    pub fn top_right(&self) -> Point {
        self.corners[3]
    }

    pub fn bounding_rect(&self) -> Rect {
        // Four corners are always present.
        Rect::from_points(&self.corners).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Whether the quad keeps left/right and top/bottom ordering.
    ///
    /// Both left corners must lie strictly left of both right corners, and
    /// both top corners strictly above both bottom corners. Self-intersecting
    /// quads whose corners still satisfy the ordering are not detected.
    pub fn preserves_orientation(&self) -> bool {
        let [tl, bl, br, tr] = self.corners;
        if !self.corners.iter().all(Point::is_finite) {
            return false;
        }
        tl.x < br.x
            && tl.x < tr.x
            && bl.x < br.x
            && bl.x < tr.x
            && tl.y < bl.y
            && tl.y < br.y
            && tr.y < bl.y
            && tr.y < br.y
    }

    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(self.corners.to_vec())
    }
}
