//! Ordered multi-strategy dispatch

use pinpoint_core::{Confidence, ConfigError, DetectionError, LocateRequest, Point, Screenshot};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::diagnostics::{GroundingEvent, SharedSink, tracing_sink};
use crate::strategy::{GroundingStrategy, LocateOutcome, Strategy, StrategyKind};

/// An accepted, in-bounds point and the strategy that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocateResult {
    pub point: Point,
    pub confidence: Confidence,
    pub strategy: String,
    pub kind: StrategyKind,
    /// Position of the strategy in the engine's order
    pub index: usize,
}

/// Tries strategies strictly in registration order. The first in-bounds
/// match wins; confidences are never compared across strategies.
pub struct MultiStrategyEngine {
    strategies: Vec<Strategy>,
    last_successful: Option<usize>,
    sink: SharedSink,
}

impl Default for MultiStrategyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiStrategyEngine {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
            last_successful: None,
            sink: tracing_sink(),
        }
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Append a strategy after checking its contract
    pub fn add_strategy(&mut self, strategy: impl Into<Strategy>) -> Result<(), ConfigError> {
        let strategy = strategy.into();
        strategy.check_contract()?;

        if self.strategies.iter().any(|s| s.name() == strategy.name()) {
            return Err(ConfigError::InvalidStrategy {
                name: strategy.name().to_string(),
                reason: "a strategy with this name is already registered".to_string(),
            });
        }

        self.sink.report(&GroundingEvent::StrategyRegistered {
            strategy: strategy.name(),
            kind: strategy.kind(),
            position: self.strategies.len() + 1,
        });
        self.strategies.push(strategy);
        Ok(())
    }

    pub fn with_strategy(mut self, strategy: impl Into<Strategy>) -> Result<Self, ConfigError> {
        self.add_strategy(strategy)?;
        Ok(self)
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn strategy(&self, name: &str) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Strategy that produced the most recent accepted result, if the most
    /// recent call produced one
    pub fn last_successful_strategy(&self) -> Option<&Strategy> {
        self.last_successful.and_then(|i| self.strategies.get(i))
    }

    /// Run the fallback chain. Absence is a normal outcome.
    pub fn locate(
        &mut self,
        screenshot: &Screenshot,
        request: &LocateRequest,
    ) -> Option<LocateResult> {
        self.last_successful = None;
        let total = self.strategies.len();
        self.sink.report(&GroundingEvent::SearchStarted {
            target: &request.target,
            strategies: total,
        });

        for (index, strategy) in self.strategies.iter_mut().enumerate() {
            self.sink.report(&GroundingEvent::StrategyAttempt {
                strategy: strategy.name(),
                index: index + 1,
                total,
            });

            let attempt = AssertUnwindSafe(|| strategy.locate(screenshot, request));
            let outcome = panic::catch_unwind(attempt).unwrap_or_else(|payload| {
                strategy.record_failure();
                LocateOutcome::Failed(DetectionError::Panicked(panic_message(payload.as_ref())))
            });

            match outcome {
                LocateOutcome::Found { point, confidence } => {
                    if !strategy.validate(point, screenshot) {
                        let (width, height) = screenshot.dimensions();
                        self.sink.report(&GroundingEvent::StrategyRejected {
                            strategy: strategy.name(),
                            point,
                            width,
                            height,
                        });
                        continue;
                    }

                    self.sink.report(&GroundingEvent::StrategyMatched {
                        strategy: strategy.name(),
                        point,
                        confidence,
                    });
                    self.last_successful = Some(index);
                    return Some(LocateResult {
                        point,
                        confidence,
                        strategy: strategy.name().to_string(),
                        kind: strategy.kind(),
                        index,
                    });
                }
                LocateOutcome::NotFound => {
                    self.sink.report(&GroundingEvent::StrategyMissed {
                        strategy: strategy.name(),
                    });
                }
                LocateOutcome::Failed(error) => {
                    self.sink.report(&GroundingEvent::StrategyFailed {
                        strategy: strategy.name(),
                        error: &error,
                    });
                }
            }
        }

        self.sink.report(&GroundingEvent::SearchExhausted {
            target: &request.target,
            strategies: total,
        });
        None
    }

    /// `locate` reduced to the accepted point
    pub fn locate_point(
        &mut self,
        screenshot: &Screenshot,
        request: &LocateRequest,
    ) -> Option<Point> {
        self.locate(screenshot, request).map(|result| result.point)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "strategy panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::strategy::{OcrConfig, OcrStrategy};
    use crate::text::RecordedTextDetector;
    use image::RgbaImage;
    use pinpoint_core::{Polygon, TextDetection};
    use std::sync::Arc;

    fn ocr(name: &str, detections: Vec<TextDetection>) -> OcrStrategy {
        OcrStrategy::new(Arc::new(RecordedTextDetector::new(detections)), OcrConfig::default())
            .unwrap()
            .with_name(name)
    }

    fn word(x: f64, y: f64, text: &str) -> TextDetection {
        TextDetection::new(Polygon::from_bounds(x, y, x + 10.0, y + 10.0), text, 0.9)
    }

    #[test]
    fn test_empty_engine_finds_nothing() {
        let mut engine = MultiStrategyEngine::new();
        let screenshot = Screenshot::new(RgbaImage::new(10, 10));
        assert!(engine.is_empty());
        assert_eq!(engine.locate(&screenshot, &LocateRequest::new("x")), None);
        assert!(engine.last_successful_strategy().is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut engine = MultiStrategyEngine::new();
        engine.add_strategy(ocr("OCR", vec![])).unwrap();
        assert!(matches!(
            engine.add_strategy(ocr("OCR", vec![])),
            Err(ConfigError::InvalidStrategy { .. })
        ));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_out_of_bounds_match_falls_through() {
        let sink = Arc::new(MemorySink::new());
        let mut engine = MultiStrategyEngine::new()
            .with_sink(sink.clone())
            .with_strategy(ocr("offscreen", vec![word(500.0, 500.0, "Save")]))
            .unwrap()
            .with_strategy(ocr("onscreen", vec![word(20.0, 20.0, "Save")]))
            .unwrap();

        let screenshot = Screenshot::new(RgbaImage::new(100, 100));
        let result = engine.locate(&screenshot, &LocateRequest::new("Save")).unwrap();
        assert_eq!(result.point, Point::new(25, 25));
        assert_eq!(result.strategy, "onscreen");
        assert_eq!(result.index, 1);
        assert!(sink.contains("outside 100x100 screenshot"));
        assert_eq!(engine.last_successful_strategy().map(|s| s.name()), Some("onscreen"));
    }

    #[test]
    fn test_last_successful_resets_each_call() {
        let mut engine = MultiStrategyEngine::new()
            .with_strategy(ocr("OCR", vec![word(20.0, 20.0, "Save")]))
            .unwrap();
        let screenshot = Screenshot::new(RgbaImage::new(100, 100));

        assert!(engine.locate(&screenshot, &LocateRequest::new("Save")).is_some());
        assert!(engine.last_successful_strategy().is_some());
        assert!(engine.locate(&screenshot, &LocateRequest::new("Open")).is_none());
        assert!(engine.last_successful_strategy().is_none());
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "strategy panicked");
    }
}
