//! Pinpoint core data model
//!
//! Screenshots, points, confidences and the raw outputs of detection
//! primitives, shared by the grounding engine and its callers.

pub mod confidence;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod request;
pub mod screenshot;

pub use confidence::{Confidence, ConfidenceClass};
pub use detection::{Hit, TemplateMatch, TextDetection};
pub use error::{ConfigError, DetectionError};
pub use geometry::{BoundingBox, Point, Polygon};
pub use request::LocateRequest;
pub use screenshot::Screenshot;
