//! Pixel geometry shared by every detector
//!
//! Template matchers report axis-aligned boxes, text detectors report
//! (possibly rotated) corner polygons. Both reduce to a single `Point`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer pixel coordinate in screenshot space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned box as reported by template matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    /// Create a new bounding box
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Centre point, truncating half extents
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2, self.top + self.height / 2)
    }
}

/// Corner points of a detected region, not necessarily axis-aligned
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    corners: Vec<(f64, f64)>,
}

impl Polygon {
    pub fn new(corners: Vec<(f64, f64)>) -> Self {
        Self { corners }
    }

    /// Rectangle given as `[x_min, y_min, x_max, y_max]`, the layout vision
    /// models usually emit.
    pub fn from_bounds(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self::new(vec![
            (x_min, y_min),
            (x_max, y_min),
            (x_max, y_max),
            (x_min, y_max),
        ])
    }

    pub fn corners(&self) -> &[(f64, f64)] {
        &self.corners
    }

    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    /// Mean of the corner coordinates, truncated toward zero.
    ///
    /// `None` for an empty polygon or one with non-finite corners.
    pub fn centroid(&self) -> Option<Point> {
        if self.corners.is_empty() {
            return None;
        }

        let n = self.corners.len() as f64;
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
        let (cx, cy) = (sx / n, sy / n);

        if !cx.is_finite() || !cy.is_finite() {
            return None;
        }

        Some(Point::new(cx.trunc() as i32, cy.trunc() as i32))
    }
}
