use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, check_unit_interval};

/// What to look for, plus per-call options.
///
/// `target` is free text for OCR and vision strategies; template strategies
/// carry their own reference image and ignore it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocateRequest {
    pub target: String,
    /// Overrides the template strategy's configured threshold
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub case_sensitive: bool,
    /// Require equality instead of substring containment
    #[serde(default)]
    pub exact_match: bool,
    /// Overrides the fuzzy strategy's similarity threshold
    #[serde(default)]
    pub fuzzy_threshold: Option<f64>,
}

impl LocateRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = Some(threshold);
        self
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn exact(mut self, yes: bool) -> Self {
        self.exact_match = yes;
        self
    }

    /// Target with surrounding whitespace removed
    pub fn trimmed_target(&self) -> &str {
        self.target.trim()
    }

    /// Check every override lies in `[0, 1]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(t) = self.threshold {
            check_unit_interval("threshold override", t)?;
        }
        if let Some(t) = self.fuzzy_threshold {
            check_unit_interval("fuzzy threshold override", t)?;
        }
        Ok(())
    }
}
