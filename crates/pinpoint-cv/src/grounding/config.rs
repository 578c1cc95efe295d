//! Grounding configuration

use crate::strategy::{FuzzyConfig, OcrConfig, StrategyKind, ThresholdLadder, VisionConfig};
use crate::template::TemplateConfig;
use crate::utils::MarkerStyle;
use pinpoint_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Main grounding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingConfig {
    /// Strategies to build, in fallback order
    pub strategy_order: Vec<StrategyKind>,
    pub template: TemplateConfig,
    pub templates: TemplateSource,
    pub adaptive: AdaptiveConfig,
    pub ocr: OcrConfig,
    pub fuzzy: FuzzyConfig,
    pub vision: VisionConfig,
    pub debug: DebugConfig,
}

/// Where the reference image for template strategies comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSource {
    pub dirs: Vec<PathBuf>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    pub thresholds: ThresholdLadder,
}

/// Annotated screenshots for audit trails
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub save_screenshots: bool,
    pub output_dir: PathBuf,
    pub marker: MarkerStyle,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            strategy_order: vec![StrategyKind::AdaptiveTemplate, StrategyKind::FuzzyOcr],
            template: TemplateConfig::default(),
            templates: TemplateSource::default(),
            adaptive: AdaptiveConfig::default(),
            ocr: OcrConfig::default(),
            fuzzy: FuzzyConfig::default(),
            vision: VisionConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for TemplateSource {
    fn default() -> Self {
        Self {
            dirs: vec!["resources".into()],
            name: "notepad_icon".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            save_screenshots: false,
            output_dir: "screenshots".into(),
            marker: MarkerStyle::default(),
        }
    }
}

impl GroundingConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            strategies = config.strategy_order.len(),
            "grounding config loaded"
        );
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Thresholds in `[0, 1]`, a well-formed ladder, a usable strategy order
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strategy_order.is_empty() {
            return Err(ConfigError::Invalid("strategy_order is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for kind in &self.strategy_order {
            if !seen.insert(kind) {
                return Err(ConfigError::InvalidStrategy {
                    name: kind.to_string(),
                    reason: "listed more than once in strategy_order".to_string(),
                });
            }
        }

        self.template.validate()?;
        // Re-check in case the ladder was built in code rather than parsed
        ThresholdLadder::new(self.adaptive.thresholds.thresholds().to_vec())?;
        self.ocr.validate()?;
        self.fuzzy.validate()?;
        self.vision.validate()?;

        if self.strategy_order.iter().any(|k| {
            matches!(k, StrategyKind::Template | StrategyKind::AdaptiveTemplate)
        }) && self.templates.name.trim().is_empty()
        {
            return Err(ConfigError::MissingTemplate("no template name configured".to_string()));
        }
        Ok(())
    }

    pub fn uses(&self, kind: StrategyKind) -> bool {
        self.strategy_order.contains(&kind)
    }
}
