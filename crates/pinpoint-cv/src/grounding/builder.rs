//! Assemble an engine from configuration and backends

use pinpoint_core::ConfigError;
use std::sync::Arc;

use super::config::GroundingConfig;
use super::engine::MultiStrategyEngine;
use crate::diagnostics::{SharedSink, tracing_sink};
use crate::strategy::{
    AdaptiveTemplateStrategy, FuzzyOcrStrategy, OcrStrategy, Strategy, StrategyKind,
    TemplateStrategy, VisionStrategy,
};
use crate::template::{NccMatcher, Template, TemplateLoader};
use crate::traits::{PhraseGrounder, TemplateMatchable, TextDetector};

/// Builds one strategy per entry of `strategy_order`.
///
/// Template strategies fall back to [`NccMatcher`] when no matcher is given
/// and load their template through [`TemplateLoader`] unless one is supplied.
/// Text and vision strategies have no built-in backend.
pub struct EngineBuilder {
    config: GroundingConfig,
    template: Option<Template>,
    matcher: Option<Arc<dyn TemplateMatchable>>,
    detector: Option<Arc<dyn TextDetector>>,
    grounder: Option<Arc<dyn PhraseGrounder>>,
    sink: SharedSink,
}

impl EngineBuilder {
    pub fn new(config: GroundingConfig) -> Self {
        Self {
            config,
            template: None,
            matcher: None,
            detector: None,
            grounder: None,
            sink: tracing_sink(),
        }
    }

    pub fn template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }

    pub fn matcher(mut self, matcher: Arc<dyn TemplateMatchable>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn text_detector(mut self, detector: Arc<dyn TextDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn phrase_grounder(mut self, grounder: Arc<dyn PhraseGrounder>) -> Self {
        self.grounder = Some(grounder);
        self
    }

    pub fn sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &GroundingConfig {
        &self.config
    }

    pub fn build(self) -> Result<MultiStrategyEngine, ConfigError> {
        self.config.validate()?;

        let needs_template = self.config.uses(StrategyKind::Template)
            || self.config.uses(StrategyKind::AdaptiveTemplate);
        let template = match (&self.template, needs_template) {
            (Some(t), true) => Some(t.clone()),
            (None, true) => Some(self.load_template()?),
            (_, false) => None,
        };

        let mut engine = MultiStrategyEngine::new().with_sink(self.sink.clone());
        for &kind in &self.config.strategy_order {
            let strategy = self.build_strategy(kind, template.as_ref())?;
            engine.add_strategy(strategy)?;
        }

        tracing::info!(strategies = engine.len(), "grounding engine ready");
        Ok(engine)
    }

    fn load_template(&self) -> Result<Template, ConfigError> {
        let loader = self
            .config
            .templates
            .dirs
            .iter()
            .fold(TemplateLoader::new(), |loader, dir| loader.add_template_dir(dir));
        loader.load_required(&self.config.templates.name)
    }

    fn matcher_or_default(&self) -> Arc<dyn TemplateMatchable> {
        match &self.matcher {
            Some(m) => Arc::clone(m),
            None => Arc::new(NccMatcher::from_config(&self.config.template)),
        }
    }

    fn detector_for(&self, kind: StrategyKind) -> Result<Arc<dyn TextDetector>, ConfigError> {
        self.detector.clone().ok_or_else(|| ConfigError::MissingBackend {
            strategy: kind.to_string(),
            backend: "text detector".to_string(),
        })
    }

    fn build_strategy(
        &self,
        kind: StrategyKind,
        template: Option<&Template>,
    ) -> Result<Strategy, ConfigError> {
        let require_template = || {
            template
                .cloned()
                .ok_or_else(|| ConfigError::MissingTemplate(self.config.templates.name.clone()))
        };

        let strategy: Strategy = match kind {
            StrategyKind::Template => TemplateStrategy::new(
                require_template()?,
                self.config.template.threshold,
                self.matcher_or_default(),
            )?
            .with_sink(self.sink.clone())
            .into(),
            StrategyKind::AdaptiveTemplate => {
                let base = TemplateStrategy::new(
                    require_template()?,
                    self.config.template.threshold,
                    self.matcher_or_default(),
                )?;
                AdaptiveTemplateStrategy::new(base, self.config.adaptive.thresholds.clone())?
                    .with_sink(self.sink.clone())
                    .into()
            }
            StrategyKind::Ocr => {
                OcrStrategy::new(self.detector_for(kind)?, self.config.ocr.clone())?
                    .with_sink(self.sink.clone())
                    .into()
            }
            StrategyKind::FuzzyOcr => {
                let ocr = OcrStrategy::new(self.detector_for(kind)?, self.config.ocr.clone())?;
                FuzzyOcrStrategy::new(ocr, &self.config.fuzzy)?
                    .with_sink(self.sink.clone())
                    .into()
            }
            StrategyKind::Vision => {
                let grounder = self.grounder.clone().ok_or_else(|| ConfigError::MissingBackend {
                    strategy: kind.to_string(),
                    backend: "phrase grounder".to_string(),
                })?;
                VisionStrategy::new(grounder, self.config.vision.clone())?
                    .with_sink(self.sink.clone())
                    .into()
            }
        };
        Ok(strategy)
    }
}
