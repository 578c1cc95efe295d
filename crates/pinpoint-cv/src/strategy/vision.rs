//! Phrase grounding through a vision-language model

use pinpoint_core::error::check_unit_interval;
use pinpoint_core::{
    Confidence, ConfigError, DetectionError, Hit, LocateRequest, Point, Polygon, Screenshot,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{GroundingStrategy, LocateOutcome, StrategyKind, check_name, require_target};
use crate::diagnostics::{GroundingEvent, SharedSink, tracing_sink};
use crate::traits::PhraseGrounder;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Reported for every region; grounding models expose no score
    pub assumed_confidence: f64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            assumed_confidence: 0.9,
        }
    }
}

impl VisionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("vision assumed_confidence", self.assumed_confidence)?;
        Ok(())
    }
}

pub struct VisionStrategy {
    name: String,
    grounder: Arc<dyn PhraseGrounder>,
    config: VisionConfig,
    last_confidence: Confidence,
    sink: SharedSink,
}

impl VisionStrategy {
    pub fn new(
        grounder: Arc<dyn PhraseGrounder>,
        config: VisionConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            name: "VisionModel".to_string(),
            grounder,
            config,
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

    /// Centroid of every region the model grounds `phrase` to
    pub fn detect_all(
        &self,
        screenshot: &Screenshot,
        phrase: &str,
    ) -> Result<Vec<Hit>, DetectionError> {
        if phrase.trim().is_empty() {
            return Err(DetectionError::MalformedInput("phrase is empty".to_string()));
        }
        let regions = self.grounder.ground_phrase(screenshot, phrase.trim())?;
        Ok(regions
            .iter()
            .filter_map(|region| region.centroid())
            .map(|point| Hit {
                label: phrase.trim().to_string(),
                point,
                confidence: self.config.assumed_confidence,
            })
            .collect())
    }

    pub(crate) fn record_failure(&mut self) {
        self.last_confidence = Confidence::ERROR;
    }

    /// Centre of the most likely region that has one
    fn first_usable_region(&self, regions: &[Polygon], phrase: &str) -> Option<Point> {
        let total = regions.len();
        for (i, region) in regions.iter().enumerate() {
            match region.centroid() {
                Some(point) => {
                    self.sink.report(&GroundingEvent::RegionGrounded {
                        strategy: &self.name,
                        phrase,
                        region: i + 1,
                        total,
                        point,
                    });
                    return Some(point);
                }
                None => self.sink.report(&GroundingEvent::RegionSkipped {
                    strategy: &self.name,
                    region: i + 1,
                    total,
                }),
            }
        }
        None
    }
}

impl GroundingStrategy for VisionStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Vision
    }

    fn locate(&mut self, screenshot: &Screenshot, request: &LocateRequest) -> LocateOutcome {
        let regions = require_target(request)
            .and_then(|()| self.grounder.ground_phrase(screenshot, request.trimmed_target()));

        let outcome = match regions {
            Ok(regions) => match self.first_usable_region(&regions, request.trimmed_target()) {
                Some(point) => {
                    LocateOutcome::found(point, Confidence::matched(self.config.assumed_confidence))
                }
                None => LocateOutcome::NotFound,
            },
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
