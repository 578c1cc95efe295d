//! Grounding strategies
//!
//! Every detector variant implements [`GroundingStrategy`]. The engine holds
//! them as the closed [`Strategy`] enum so its dispatch loop never needs to
//! know which variant it is running.

pub mod adaptive;
pub mod fuzzy;
pub mod ocr;
pub mod template;
pub mod vision;

pub use adaptive::{AdaptiveTemplateStrategy, ThresholdLadder};
pub use fuzzy::{FuzzyConfig, FuzzyOcrStrategy};
pub use ocr::{OcrConfig, OcrStrategy};
pub use template::TemplateStrategy;
pub use vision::{VisionConfig, VisionStrategy};

use pinpoint_core::{Confidence, ConfigError, DetectionError, LocateRequest, Point, Screenshot};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Template,
    AdaptiveTemplate,
    Ocr,
    FuzzyOcr,
    Vision,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Template => "template",
            StrategyKind::AdaptiveTemplate => "adaptive_template",
            StrategyKind::Ocr => "ocr",
            StrategyKind::FuzzyOcr => "fuzzy_ocr",
            StrategyKind::Vision => "vision",
        };
        f.write_str(name)
    }
}

/// Result of one strategy's locate call
#[derive(Debug)]
pub enum LocateOutcome {
    Found { point: Point, confidence: Confidence },
    NotFound,
    Failed(DetectionError),
}

impl LocateOutcome {
    pub fn found(point: Point, confidence: Confidence) -> Self {
        LocateOutcome::Found { point, confidence }
    }

    pub fn point(&self) -> Option<Point> {
        match self {
            LocateOutcome::Found { point, .. } => Some(*point),
            _ => None,
        }
    }

    /// Confidence class this outcome stands for
    pub fn confidence(&self) -> Confidence {
        match self {
            LocateOutcome::Found { confidence, .. } => *confidence,
            LocateOutcome::NotFound => Confidence::NO_MATCH,
            LocateOutcome::Failed(_) => Confidence::ERROR,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LocateOutcome::Found { .. })
    }
}

/// Common contract of every detection technique
pub trait GroundingStrategy {
    fn name(&self) -> &str;

    fn kind(&self) -> StrategyKind;

    /// Attempt detection. "Not found" and primitive failures are outcomes,
    /// never panics or propagated errors.
    fn locate(&mut self, screenshot: &Screenshot, request: &LocateRequest) -> LocateOutcome;

    /// Confidence of the most recent `locate` call; `-1` before any call
    fn confidence(&self) -> Confidence;

    /// True iff the point lies inside the screenshot's pixel rectangle
    fn validate(&self, point: Point, screenshot: &Screenshot) -> bool {
        screenshot.contains(point)
    }

    /// Configuration check run when the strategy is registered
    fn check_contract(&self) -> Result<(), ConfigError>;
}

/// The closed set of strategy variants the engine dispatches over
pub enum Strategy {
    Template(TemplateStrategy),
    AdaptiveTemplate(AdaptiveTemplateStrategy),
    Ocr(OcrStrategy),
    FuzzyOcr(FuzzyOcrStrategy),
    Vision(VisionStrategy),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Strategy::Template($s) => $body,
            Strategy::AdaptiveTemplate($s) => $body,
            Strategy::Ocr($s) => $body,
            Strategy::FuzzyOcr($s) => $body,
            Strategy::Vision($s) => $body,
        }
    };
}

impl Strategy {
    /// Record that the last locate call ended abnormally
    pub(crate) fn record_failure(&mut self) {
        dispatch!(self, s => s.record_failure())
    }
}

impl GroundingStrategy for Strategy {
    fn name(&self) -> &str {
        dispatch!(self, s => s.name())
    }

    fn kind(&self) -> StrategyKind {
        dispatch!(self, s => s.kind())
    }

    fn locate(&mut self, screenshot: &Screenshot, request: &LocateRequest) -> LocateOutcome {
        dispatch!(self, s => s.locate(screenshot, request))
    }

    fn confidence(&self) -> Confidence {
        dispatch!(self, s => s.confidence())
    }

    fn validate(&self, point: Point, screenshot: &Screenshot) -> bool {
        dispatch!(self, s => s.validate(point, screenshot))
    }

    fn check_contract(&self) -> Result<(), ConfigError> {
        dispatch!(self, s => s.check_contract())
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("confidence", &self.confidence())
            .finish()
    }
}

impl From<TemplateStrategy> for Strategy {
    fn from(s: TemplateStrategy) -> Self {
        Strategy::Template(s)
    }
}

impl From<AdaptiveTemplateStrategy> for Strategy {
    fn from(s: AdaptiveTemplateStrategy) -> Self {
        Strategy::AdaptiveTemplate(s)
    }
}

impl From<OcrStrategy> for Strategy {
    fn from(s: OcrStrategy) -> Self {
        Strategy::Ocr(s)
    }
}

impl From<FuzzyOcrStrategy> for Strategy {
    fn from(s: FuzzyOcrStrategy) -> Self {
        Strategy::FuzzyOcr(s)
    }
}

impl From<VisionStrategy> for Strategy {
    fn from(s: VisionStrategy) -> Self {
        Strategy::Vision(s)
    }
}

/// Shared name check for `check_contract`
pub(crate) fn check_name(name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::InvalidStrategy {
            name: name.to_string(),
            reason: "strategy name is empty".to_string(),
        });
    }
    Ok(())
}

/// Reject a blank target for strategies that search by text
pub(crate) fn require_target(request: &LocateRequest) -> Result<(), DetectionError> {
    if request.trimmed_target().is_empty() {
        return Err(DetectionError::MalformedInput("target text is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_confidence_classes() {
        let found = LocateOutcome::found(Point::new(1, 2), Confidence::matched(0.8));
        assert_eq!(found.point(), Some(Point::new(1, 2)));
        assert_eq!(found.confidence().value(), 0.8);

        assert_eq!(LocateOutcome::NotFound.confidence(), Confidence::NO_MATCH);
        let failed = LocateOutcome::Failed(DetectionError::Unavailable("gone".into()));
        assert!(failed.confidence().is_error());
        assert_eq!(failed.point(), None);
    }

    #[test]
    fn test_kind_display_matches_serde_name() {
        for kind in [
            StrategyKind::Template,
            StrategyKind::AdaptiveTemplate,
            StrategyKind::Ocr,
            StrategyKind::FuzzyOcr,
            StrategyKind::Vision,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
