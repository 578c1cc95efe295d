//! Text-based grounding over a pluggable text detector

use pinpoint_core::error::check_unit_interval;
use pinpoint_core::{
    Confidence, ConfigError, DetectionError, Hit, LocateRequest, Point, Screenshot, TextDetection,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{GroundingStrategy, LocateOutcome, StrategyKind, check_name, require_target};
use crate::diagnostics::{GroundingEvent, SharedSink, tracing_sink};
use crate::text::text_matches;
use crate::traits::TextDetector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Languages the text detector must support, checked when the strategy is built
    pub languages: Vec<String>,
    /// Detections below this confidence are ignored
    pub confidence_threshold: f64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            confidence_threshold: 0.6,
        }
    }
}

impl OcrConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("ocr confidence_threshold", self.confidence_threshold)?;
        Ok(())
    }
}

pub struct OcrStrategy {
    name: String,
    config: OcrConfig,
    detector: Arc<dyn TextDetector>,
    last_confidence: Confidence,
    sink: SharedSink,
}

impl OcrStrategy {
    pub fn new(detector: Arc<dyn TextDetector>, config: OcrConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if let Some(language) = config.languages.iter().find(|l| !detector.supports_language(l)) {
            return Err(ConfigError::Invalid(format!(
                "text detector does not support language '{language}'"
            )));
        }
        Ok(Self {
            name: "OCR".to_string(),
            config,
            detector,
            last_confidence: Confidence::default(),
            sink: tracing_sink(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    pub(crate) fn sink(&self) -> &SharedSink {
        &self.sink
    }

    pub(crate) fn set_last_confidence(&mut self, confidence: Confidence) {
        self.last_confidence = confidence;
    }

    pub(crate) fn record_failure(&mut self) {
        self.last_confidence = Confidence::ERROR;
    }

    /// Detections that clear the confidence threshold and have a usable center
    pub(crate) fn usable_detections(
        &self,
        screenshot: &Screenshot,
    ) -> Result<Vec<(TextDetection, Point)>, DetectionError> {
        let detections = self.detector.detect_text(screenshot)?;
        Ok(detections
            .into_iter()
            .filter(|d| {
                d.confidence.is_finite() && d.confidence >= self.config.confidence_threshold
            })
            .filter_map(|d| {
                let center = d.center()?;
                Some((d, center))
            })
            .collect())
    }

    /// Every text region above the confidence threshold, in detector order
    pub fn all_text(&self, screenshot: &Screenshot) -> Result<Vec<Hit>, DetectionError> {
        Ok(self
            .usable_detections(screenshot)?
            .into_iter()
            .map(|(d, point)| Hit {
                label: d.text,
                point,
                confidence: d.confidence,
            })
            .collect())
    }

    /// Every region whose text matches the request, most confident first
    pub fn find_all(
        &self,
        screenshot: &Screenshot,
        request: &LocateRequest,
        max_results: Option<usize>,
    ) -> Result<Vec<Hit>, DetectionError> {
        require_target(request)?;
        let mut hits: Vec<Hit> = self
            .usable_detections(screenshot)?
            .into_iter()
            .filter(|(d, _)| text_matches(&d.text, request))
            .map(|(d, point)| Hit {
                label: d.text,
                point,
                confidence: d.confidence,
            })
            .collect();

        hits.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        if let Some(max) = max_results {
            hits.truncate(max);
        }
        Ok(hits)
    }

    fn best_match(
        &self,
        screenshot: &Screenshot,
        request: &LocateRequest,
    ) -> Result<Option<(Point, f64)>, DetectionError> {
        require_target(request)?;
        let mut best: Option<(Point, f64)> = None;
        for (d, center) in self.usable_detections(screenshot)? {
            if !text_matches(&d.text, request) {
                continue;
            }
            self.sink.report(&GroundingEvent::TextCandidate {
                strategy: &self.name,
                text: &d.text,
                confidence: d.confidence,
                score: d.confidence,
            });
            // Strictly greater keeps the earliest detection on ties
            if best.is_none_or(|(_, conf)| d.confidence > conf) {
                best = Some((center, d.confidence));
            }
        }
        Ok(best)
    }
}

impl GroundingStrategy for OcrStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Ocr
    }

    fn locate(&mut self, screenshot: &Screenshot, request: &LocateRequest) -> LocateOutcome {
        let outcome = match self.best_match(screenshot, request) {
            Ok(Some((point, conf))) => LocateOutcome::found(point, Confidence::matched(conf)),
            Ok(None) => LocateOutcome::NotFound,
            Err(e) => LocateOutcome::Failed(e),
        };
        self.last_confidence = outcome.confidence();
        outcome
    }

    fn confidence(&self) -> Confidence {
        self.last_confidence
    }

    fn check_contract(&self) -> Result<(), ConfigError> {
        check_name(&self.name)?;
        self.config.validate()
    }
}
