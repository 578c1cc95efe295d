//! Template matching module

pub mod loader;
pub mod matcher;

pub use loader::TemplateLoader;
pub use matcher::NccMatcher;

use image::GrayImage;
use pinpoint_core::ConfigError;
use pinpoint_core::error::check_unit_interval;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Preloaded reference image
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub image: GrayImage,
    pub metadata: HashMap<String, String>,
}

impl Template {
    pub fn new(name: String, image: GrayImage) -> Self {
        Self {
            name,
            image,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Template matching method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMethod {
    /// Normalized cross-correlation (default, good for general use)
    #[default]
    CrossCorrelationNormalized,
    /// Normalized squared difference (inverted: lower is better)
    SumOfSquaredErrorsNormalized,
}

impl MatchingMethod {
    pub fn to_imageproc(self) -> imageproc::template_matching::MatchTemplateMethod {
        use imageproc::template_matching::MatchTemplateMethod::*;
        match self {
            MatchingMethod::CrossCorrelationNormalized => CrossCorrelationNormalized,
            MatchingMethod::SumOfSquaredErrorsNormalized => SumOfSquaredErrorsNormalized,
        }
    }

    pub fn is_inverted(self) -> bool {
        matches!(self, MatchingMethod::SumOfSquaredErrorsNormalized)
    }
}

/// Template matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub threshold: f64,
    pub matching_method: MatchingMethod,
    pub scale_factors: Vec<f64>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            matching_method: MatchingMethod::CrossCorrelationNormalized,
            scale_factors: vec![1.0],
        }
    }
}

impl TemplateConfig {
    /// Tolerates icons rendered slightly smaller or larger than the template
    pub fn multi_scale() -> Self {
        Self {
            scale_factors: vec![1.0, 0.9, 1.1, 0.8, 1.25],
            ..Default::default()
        }
    }

    /// Squared-difference matching, stricter on flat regions
    pub fn squared_difference() -> Self {
        Self {
            threshold: 0.85,
            matching_method: MatchingMethod::SumOfSquaredErrorsNormalized,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("template threshold", self.threshold)?;
        if self.scale_factors.is_empty() {
            return Err(ConfigError::Invalid("template scale_factors is empty".to_string()));
        }
        if let Some(bad) = self.scale_factors.iter().find(|s| !(**s > 0.0 && s.is_finite())) {
            return Err(ConfigError::Invalid(format!(
                "template scale factor must be positive, got {bad}"
            )));
        }
        Ok(())
    }
}
