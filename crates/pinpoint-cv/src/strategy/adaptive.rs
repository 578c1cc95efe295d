//! Template matching over a descending threshold ladder
//!
//! Strict thresholds first, so a weak match is never accepted while a strict
//! one exists; looser rungs recover occluded, re-themed or rescaled icons.

use pinpoint_core::error::check_unit_interval;
use pinpoint_core::{Confidence, ConfigError, LocateRequest, Screenshot};
use serde::{Deserialize, Serialize};

use super::{GroundingStrategy, LocateOutcome, StrategyKind, TemplateStrategy, check_name};
use crate::diagnostics::{GroundingEvent, SharedSink};

/// Non-empty, strictly descending thresholds in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ThresholdLadder(Vec<f64>);

impl ThresholdLadder {
    pub fn new(thresholds: Vec<f64>) -> Result<Self, ConfigError> {
        if thresholds.is_empty() {
            return Err(ConfigError::EmptyLadder);
        }
        for &t in &thresholds {
            check_unit_interval("ladder threshold", t)?;
        }
        if thresholds.windows(2).any(|w| w[1] >= w[0]) {
            return Err(ConfigError::UnorderedLadder(thresholds));
        }
        Ok(Self(thresholds))
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.0
    }

    pub fn strictest(&self) -> f64 {
        self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ThresholdLadder {
    fn default() -> Self {
        Self(vec![0.9, 0.8, 0.7, 0.6, 0.5])
    }
}

impl TryFrom<Vec<f64>> for ThresholdLadder {
    type Error = ConfigError;

    fn try_from(thresholds: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(thresholds)
    }
}

impl From<ThresholdLadder> for Vec<f64> {
    fn from(ladder: ThresholdLadder) -> Self {
        ladder.0
    }
}

pub struct AdaptiveTemplateStrategy {
    base: TemplateStrategy,
    ladder: ThresholdLadder,
    last_rung: Option<usize>,
}

impl AdaptiveTemplateStrategy {
    /// Wrap a template strategy; its own threshold becomes the strictest rung
    pub fn new(base: TemplateStrategy, ladder: ThresholdLadder) -> Result<Self, ConfigError> {
        let mut base = base.with_name("AdaptiveTemplateMatching");
        base.update_threshold(ladder.strictest())?;
        Ok(Self {
            base,
            ladder,
            last_rung: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.base = self.base.with_name(name);
        self
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.base = self.base.with_sink(sink);
        self
    }

    pub fn ladder(&self) -> &ThresholdLadder {
        &self.ladder
    }

    /// Threshold of the rung that produced the last match
    pub fn last_matched_threshold(&self) -> Option<f64> {
        self.last_rung.map(|i| self.ladder.0[i])
    }

    pub fn base(&self) -> &TemplateStrategy {
        &self.base
    }

    pub(crate) fn record_failure(&mut self) {
        self.last_rung = None;
        self.base.record_failure();
    }
}

impl GroundingStrategy for AdaptiveTemplateStrategy {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::AdaptiveTemplate
    }

    /// The request's threshold override is ignored; the ladder sets thresholds.
    fn locate(&mut self, screenshot: &Screenshot, _request: &LocateRequest) -> LocateOutcome {
        self.last_rung = None;
        let total = self.ladder.len();

        for (i, &threshold) in self.ladder.0.iter().enumerate() {
            self.base.sink().report(&GroundingEvent::ThresholdAttempt {
                strategy: self.base.name(),
                attempt: i + 1,
                total,
                threshold,
            });

            match self.base.locate_at(screenshot, threshold) {
                LocateOutcome::NotFound => continue,
                found @ LocateOutcome::Found { .. } => {
                    self.last_rung = Some(i);
                    return found;
                }
                // Lowering the threshold cannot help an unreachable matcher
                failed @ LocateOutcome::Failed(_) => return failed,
            }
        }

        LocateOutcome::NotFound
    }

    fn confidence(&self) -> Confidence {
        self.base.confidence()
    }

    fn check_contract(&self) -> Result<(), ConfigError> {
        check_name(self.name())?;
        self.base.check_contract()
    }
}
