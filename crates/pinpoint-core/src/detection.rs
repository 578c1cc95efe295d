//! Raw primitive outputs. Produced and consumed inside a single locate call.

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point, Polygon};

/// One region reported by a text detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDetection {
    pub polygon: Polygon,
    pub text: String,
    pub confidence: f64,
}

impl TextDetection {
    pub fn new(polygon: Polygon, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence,
        }
    }

    pub fn center(&self) -> Option<Point> {
        self.polygon.centroid()
    }
}

/// Best match reported by a template matcher
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateMatch {
    pub bbox: BoundingBox,
    /// Similarity in `[0, 1]`, if the matcher exposes one
    pub score: Option<f64>,
}

impl TemplateMatch {
    pub fn new(bbox: BoundingBox, score: Option<f64>) -> Self {
        Self { bbox, score }
    }
}

/// A located instance returned by the read-only listing queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub label: String,
    pub point: Point,
    pub confidence: f64,
}
