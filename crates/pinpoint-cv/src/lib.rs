//! Pinpoint Computer Vision Library
//!
//! Grounding strategies (template, adaptive template, OCR, fuzzy OCR, vision)
//! behind one contract, and a multi-strategy engine that tries them in order
//! until one yields an in-bounds point.

pub mod diagnostics;
pub mod grounding;
pub mod strategy;
pub mod template;
pub mod text;
pub mod utils;

// Re-export commonly used types
pub use diagnostics::{
    DiagnosticsSink, GroundingEvent, MemorySink, NullSink, SharedSink, TracingSink,
};
pub use grounding::{EngineBuilder, GroundingConfig, LocateResult, MultiStrategyEngine};
pub use strategy::{
    AdaptiveTemplateStrategy, FuzzyOcrStrategy, GroundingStrategy, LocateOutcome, OcrStrategy,
    Strategy, StrategyKind, TemplateStrategy, VisionStrategy,
};
pub use template::{NccMatcher, Template, TemplateLoader};
pub use text::{ContainmentHeuristic, RecordedTextDetector, SequenceRatio, SimilarityMetric};
pub use utils::{ImageUtils, MarkerStyle};

pub use pinpoint_core::{
    BoundingBox, Confidence, ConfidenceClass, ConfigError, DetectionError, Hit, LocateRequest,
    Point, Polygon, Screenshot, TemplateMatch, TextDetection,
};

// Error handling
pub type Result<T> = anyhow::Result<T>;

/// Capabilities the strategies consume. Implementations wrap whatever
/// correlation routine or recognition model is available.
pub mod traits {
    use crate::template::Template;
    use pinpoint_core::{DetectionError, Polygon, Screenshot, TemplateMatch, TextDetection};

    /// Image-template correlation
    pub trait TemplateMatchable: Send + Sync {
        /// Best match at or above `threshold`, if any
        fn match_template(
            &self,
            screenshot: &Screenshot,
            template: &Template,
            threshold: f64,
        ) -> Result<Option<TemplateMatch>, DetectionError>;
    }

    /// Text detection and recognition
    pub trait TextDetector: Send + Sync {
        fn detect_text(
            &self,
            screenshot: &Screenshot,
        ) -> Result<Vec<TextDetection>, DetectionError>;

        /// Whether text in `language` (an ISO 639-1 code) can be read
        fn supports_language(&self, _language: &str) -> bool {
            true
        }
    }

    /// Open-vocabulary grounding of a phrase to image regions, most likely first
    pub trait PhraseGrounder: Send + Sync {
        fn ground_phrase(
            &self,
            screenshot: &Screenshot,
            phrase: &str,
        ) -> Result<Vec<Polygon>, DetectionError>;
    }

    /// String similarity in `[0, 1]`
    pub trait TextSimilarity: Send + Sync {
        fn similarity(&self, a: &str, b: &str) -> f64;

        fn name(&self) -> &'static str;
    }
}
