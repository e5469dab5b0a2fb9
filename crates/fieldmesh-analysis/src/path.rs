//! Closed 2D contours.

use fieldmesh_math::Point2;
use serde::{Deserialize, Serialize};

/// A closed polygon in the slice plane.
///
/// The last point connects back to the first and is not repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertices in order.
    pub points: Vec<Point2>,
}

impl Polygon {
    /// Wrap an ordered point list.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// True if the polygon has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Shoelace area; positive when counter-clockwise.
    pub fn signed_area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        self.edges()
            .map(|(p, q)| p.x * q.y - q.x * p.y)
            .sum::<f64>()
            / 2.0
    }

    /// Unsigned area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// True if counter-clockwise.
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Reverse the winding.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Make the winding counter-clockwise.
    pub fn ensure_ccw(&mut self) {
        if !self.is_ccw() {
            self.reverse();
        }
    }

    /// Make the winding clockwise.
    pub fn ensure_cw(&mut self) {
        if self.is_ccw() {
            self.reverse();
        }
    }

    /// Closed boundary length.
    pub fn perimeter(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.edges().map(|(p, q)| (q - p).norm()).sum()
    }

    /// Area centroid, or the vertex mean when the area vanishes.
    pub fn centroid(&self) -> Point2 {
        if self.points.is_empty() {
            return Point2::origin();
        }
        let a = self.signed_area();
        if a.abs() <= f64::EPSILON {
            let n = self.points.len() as f64;
            let sum = self
                .points
                .iter()
                .fold(Point2::origin().coords, |acc, p| acc + p.coords);
            return Point2::from(sum / n);
        }
        let (cx, cy) = self.edges().fold((0.0, 0.0), |(cx, cy), (p, q)| {
            let w = p.x * q.y - q.x * p.y;
            (cx + (p.x + q.x) * w, cy + (p.y + q.y) * w)
        });
        Point2::new(cx / (6.0 * a), cy / (6.0 * a))
    }

    /// Even-odd point containment test.
    pub fn contains(&self, pt: &Point2) -> bool {
        let mut inside = false;
        for (p, q) in self.edges() {
            if (p.y > pt.y) != (q.y > pt.y) {
                let x = p.x + (pt.y - p.y) / (q.y - p.y) * (q.x - p.x);
                if pt.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    fn edges(&self) -> impl Iterator<Item = (&Point2, &Point2)> {
        let n = self.points.len();
        (0..n).map(move |i| (&self.points[i], &self.points[(i + 1) % n]))
    }
}
