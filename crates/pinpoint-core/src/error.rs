//! Error taxonomy
//!
//! "Not found" is not an error and has no variant here. `DetectionError` is a
//! per-call failure of an underlying primitive and is absorbed by the
//! strategy that hit it. `ConfigError` makes an engine unusable and is
//! returned from setup.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("detector unavailable: {0}")]
    Unavailable(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("detector panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidThreshold { name: String, value: f64 },

    #[error("threshold ladder is empty")]
    EmptyLadder,

    #[error("threshold ladder must be strictly descending, got {0:?}")]
    UnorderedLadder(Vec<f64>),

    #[error("template not found: {0}")]
    MissingTemplate(String),

    #[error("strategy `{name}` rejected: {reason}")]
    InvalidStrategy { name: String, reason: String },

    #[error("no {backend} backend configured for strategy `{strategy}`")]
    MissingBackend { strategy: String, backend: String },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Check that a threshold lies in `[0, 1]`.
pub fn check_unit_interval(name: &str, value: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidThreshold {
            name: name.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_interval_bounds() {
        assert!(check_unit_interval("threshold", 0.0).is_ok());
        assert!(check_unit_interval("threshold", 1.0).is_ok());
        assert!(check_unit_interval("threshold", 1.5).is_err());
        assert!(check_unit_interval("threshold", -0.1).is_err());
        assert!(check_unit_interval("threshold", f64::NAN).is_err());
    }

    #[test]
    fn test_invalid_threshold_message() {
        let err = check_unit_interval("fuzzy threshold", 2.0).unwrap_err();
        assert_eq!(err.to_string(), "fuzzy threshold must lie in [0, 1], got 2");
    }
}
