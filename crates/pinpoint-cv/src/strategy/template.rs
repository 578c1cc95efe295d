//! Template matching strategy

use pinpoint_core::error::check_unit_interval;
use pinpoint_core::{Confidence, ConfigError, DetectionError, LocateRequest, Screenshot};
use std::sync::Arc;

use super::{GroundingStrategy, LocateOutcome, StrategyKind, check_name};
use crate::diagnostics::{GroundingEvent, SharedSink, tracing_sink};
use crate::template::{NccMatcher, Template, TemplateConfig};
use crate::traits::TemplateMatchable;

/// Locates a preloaded reference image with a template matcher
pub struct TemplateStrategy {
    name: String,
    template: Template,
    threshold: f64,
    matcher: Arc<dyn TemplateMatchable>,
    last_confidence: Confidence,
    sink: SharedSink,
}

impl TemplateStrategy {
    pub fn new(
        template: Template,
        threshold: f64,
        matcher: Arc<dyn TemplateMatchable>,
    ) -> Result<Self, ConfigError> {
        check_unit_interval("template threshold", threshold)?;
        Ok(Self {
            name: "TemplateMatching".to_string(),
            template,
            threshold,
            matcher,
            last_confidence: Confidence::default(),
            sink: tracing_sink(),
        })
    }

    /// Template strategy backed by the built-in correlation matcher
    pub fn from_config(template: Template, config: &TemplateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(
            template,
            config.threshold,
            Arc::new(NccMatcher::from_config(config)),
        )
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn update_threshold(&mut self, threshold: f64) -> Result<(), ConfigError> {
        self.threshold = check_unit_interval("template threshold", threshold)?;
        tracing::info!(strategy = %self.name, threshold, "updated matching threshold");
        Ok(())
    }

    pub fn update_template(&mut self, template: Template) {
        tracing::info!(strategy = %self.name, template = %template.name, "updated template");
        self.template = template;
    }

    pub(crate) fn sink(&self) -> &SharedSink {
        &self.sink
    }

    pub(crate) fn record_failure(&mut self) {
        self.last_confidence = Confidence::ERROR;
    }

    /// One matcher invocation at `threshold`
    pub(crate) fn locate_at(&mut self, screenshot: &Screenshot, threshold: f64) -> LocateOutcome {
        let outcome = match self.matcher.match_template(screenshot, &self.template, threshold) {
            Ok(Some(found)) => {
                let confidence = Confidence::matched(found.score.unwrap_or(threshold));
                LocateOutcome::found(found.bbox.center(), confidence)
            }
            Ok(None) => LocateOutcome::NotFound,
            Err(e) => LocateOutcome::Failed(e),
        };
        self.last_confidence = outcome.confidence();
        outcome
    }
}

impl GroundingStrategy for TemplateStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Template
    }

    fn locate(&mut self, screenshot: &Screenshot, request: &LocateRequest) -> LocateOutcome {
        let threshold = match request.threshold {
            None => self.threshold,
            Some(t) => match check_unit_interval("threshold override", t) {
                Ok(t) => t,
                Err(e) => {
                    self.last_confidence = Confidence::ERROR;
                    return LocateOutcome::Failed(DetectionError::MalformedInput(e.to_string()));
                }
            },
        };

        self.sink.report(&GroundingEvent::ThresholdAttempt {
            strategy: &self.name,
            attempt: 1,
            total: 1,
            threshold,
        });
        self.locate_at(screenshot, threshold)
    }

    fn confidence(&self) -> Confidence {
        self.last_confidence
    }

    fn check_contract(&self) -> Result<(), ConfigError> {
        check_name(&self.name)?;
        check_unit_interval("template threshold", self.threshold)?;
        let (w, h) = self.template.dimensions();
        if w == 0 || h == 0 {
            return Err(ConfigError::MissingTemplate(format!(
                "template '{}' has no pixels",
                self.template.name
            )));
        }
        Ok(())
    }
}
