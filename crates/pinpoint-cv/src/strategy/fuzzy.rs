//! OCR with similarity-scored matching
//!
//! Candidates qualify on text similarity alone, then compete on the product
//! of detector confidence and similarity. A confident read of the wrong text
//! and a hesitant read of the right text are both down-weighted.

use pinpoint_core::error::check_unit_interval;
use pinpoint_core::{Confidence, ConfigError, DetectionError, LocateRequest, Point, Screenshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{
    GroundingStrategy, LocateOutcome, OcrStrategy, StrategyKind, check_name, require_target,
};
use crate::diagnostics::{GroundingEvent, SharedSink};
use crate::text::{SimilarityMetric, normalize};
use crate::traits::TextSimilarity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Minimum similarity for a detection to qualify
    pub threshold: f64,
    pub metric: SimilarityMetric,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            metric: SimilarityMetric::default(),
        }
    }
}

impl FuzzyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("fuzzy threshold", self.threshold)?;
        Ok(())
    }
}

pub struct FuzzyOcrStrategy {
    ocr: OcrStrategy,
    fuzzy_threshold: f64,
    similarity: Arc<dyn TextSimilarity>,
}

impl FuzzyOcrStrategy {
    pub fn new(ocr: OcrStrategy, config: &FuzzyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!(
            threshold = config.threshold,
            metric = ?config.metric,
            "fuzzy matching enabled"
        );
        Ok(Self {
            ocr: ocr.with_name("FuzzyOCR"),
            fuzzy_threshold: config.threshold,
            similarity: config.metric.build(),
        })
    }

    /// Replace the similarity function
    pub fn with_similarity(mut self, similarity: Arc<dyn TextSimilarity>) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.ocr = self.ocr.with_name(name);
        self
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.ocr = self.ocr.with_sink(sink);
        self
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    pub fn ocr(&self) -> &OcrStrategy {
        &self.ocr
    }

    pub(crate) fn record_failure(&mut self) {
        self.ocr.record_failure();
    }

    fn best_match(
        &self,
        screenshot: &Screenshot,
        request: &LocateRequest,
    ) -> Result<Option<(Point, f64)>, DetectionError> {
        require_target(request)?;
        let threshold = match request.fuzzy_threshold {
            Some(t) => check_unit_interval("fuzzy threshold override", t)
                .map_err(|e| DetectionError::MalformedInput(e.to_string()))?,
            None => self.fuzzy_threshold,
        };
        let target = normalize(&request.target, request.case_sensitive);

        let mut best: Option<(Point, f64)> = None;
        for (d, center) in self.ocr.usable_detections(screenshot)? {
            let text = normalize(&d.text, request.case_sensitive);
            let similarity = self.similarity.similarity(&text, &target);
            if similarity.is_nan() || similarity < threshold {
                continue;
            }

            let score = d.confidence * similarity;
            self.ocr.sink().report(&GroundingEvent::TextCandidate {
                strategy: self.ocr.name(),
                text: &d.text,
                confidence: d.confidence,
                score,
            });
            // A zero score never wins; ties keep the earlier detection
            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((center, score));
            }
        }
        Ok(best)
    }
}

impl GroundingStrategy for FuzzyOcrStrategy {
    fn name(&self) -> &str {
        self.ocr.name()
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::FuzzyOcr
    }

    fn locate(&mut self, screenshot: &Screenshot, request: &LocateRequest) -> LocateOutcome {
        let outcome = match self.best_match(screenshot, request) {
            Ok(Some((point, score))) => LocateOutcome::found(point, Confidence::matched(score)),
            Ok(None) => LocateOutcome::NotFound,
            Err(e) => LocateOutcome::Failed(e),
        };
        self.ocr.set_last_confidence(outcome.confidence());
        outcome
    }

    fn confidence(&self) -> Confidence {
        self.ocr.confidence()
    }

    fn check_contract(&self) -> Result<(), ConfigError> {
        check_name(self.name())?;
        check_unit_interval("fuzzy threshold", self.fuzzy_threshold)?;
        self.ocr.check_contract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::strategy::OcrConfig;
    use crate::text::{ContainmentHeuristic, RecordedTextDetector};
    use image::RgbaImage;
    use pinpoint_core::{Polygon, TextDetection};

    fn fuzzy(detections: Vec<TextDetection>) -> FuzzyOcrStrategy {
        let ocr = OcrStrategy::new(
            Arc::new(RecordedTextDetector::new(detections)),
            OcrConfig::default(),
        )
        .unwrap();
        FuzzyOcrStrategy::new(ocr, &FuzzyConfig::default()).unwrap()
    }

    fn at(x: f64, text: &str, confidence: f64) -> TextDetection {
        TextDetection::new(Polygon::from_bounds(x, 0.0, x + 20.0, 10.0), text, confidence)
    }

    fn screen() -> Screenshot {
        Screenshot::new(RgbaImage::new(300, 50))
    }

    #[test]
    fn test_misread_text_loses_despite_higher_confidence() {
        let mut strategy = fuzzy(vec![at(0.0, "Save", 0.95), at(100.0, "S4ve", 0.99)]);

        let outcome = strategy.locate(&screen(), &LocateRequest::new("Save"));
        assert_eq!(outcome.point(), Some(Point::new(10, 5)));
        assert!((strategy.confidence().value() - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_combined_score_ranks_candidates() {
        // "submit!" scores 0.95 * 12/13 < 0.9
        let mut strategy = fuzzy(vec![at(0.0, "Submit!", 0.95), at(100.0, "Submit", 0.9)]);
        let outcome = strategy.locate(&screen(), &LocateRequest::new("submit"));
        assert_eq!(outcome.point(), Some(Point::new(110, 5)));
        assert!((strategy.confidence().value() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_override() {
        let mut strategy = fuzzy(vec![at(0.0, "S4ve", 0.99)]);
        assert!(!strategy.locate(&screen(), &LocateRequest::new("Save")).is_found());
        assert_eq!(strategy.confidence(), Confidence::NO_MATCH);

        let loose = LocateRequest::new("Save").with_fuzzy_threshold(0.7);
        assert!(strategy.locate(&screen(), &loose).is_found());

        let invalid = LocateRequest::new("Save").with_fuzzy_threshold(2.0);
        assert!(matches!(strategy.locate(&screen(), &invalid), LocateOutcome::Failed(_)));
        assert!(strategy.confidence().is_error());
    }

    #[test]
    fn test_pluggable_similarity() {
        let mut strategy = fuzzy(vec![at(0.0, "Save document", 0.8)])
            .with_similarity(Arc::new(ContainmentHeuristic));
        strategy.locate(&screen(), &LocateRequest::new("save"));
        assert!((strategy.confidence().value() - 0.72).abs() < 1e-9);
    }

    #[test]
    fn test_candidates_are_reported() {
        let sink = Arc::new(MemorySink::new());
        let mut strategy = fuzzy(vec![at(0.0, "Save", 0.95)]).with_sink(sink.clone());
        strategy.locate(&screen(), &LocateRequest::new("Save"));
        assert!(sink.contains("candidate 'Save'"));
    }
}
