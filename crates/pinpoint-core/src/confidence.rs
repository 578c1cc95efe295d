//! Tri-state confidence reported by every strategy
//!
//! `-1` means the strategy hit an internal error and made no determination,
//! `0` means it ran and found nothing, and `(0, 1]` is the certainty of a
//! match. No other value can be constructed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome class of a confidence value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceClass {
    Error,
    NoMatch,
    Match,
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    pub const ERROR: Self = Self(-1.0);
    pub const NO_MATCH: Self = Self(0.0);

    /// Smallest value a successful match can report
    pub const MIN_MATCH: f64 = f64::EPSILON;

    /// Confidence of a found match. Scores are clamped into `(0, 1]`; a
    /// match whose score is zero, negative or NaN still reports as a match.
    pub fn matched(score: f64) -> Self {
        if score > 1.0 {
            Self(1.0)
        } else if score > Self::MIN_MATCH {
            Self(score)
        } else {
            Self(Self::MIN_MATCH)
        }
    }

    /// Strict constructor: `Some` only for `-1`, `0` or a value in `(0, 1]`.
    pub fn new(value: f64) -> Option<Self> {
        if value == -1.0 || value == 0.0 || (value > 0.0 && value <= 1.0) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn class(self) -> ConfidenceClass {
        if self.0 < 0.0 {
            ConfidenceClass::Error
        } else if self.0 == 0.0 {
            ConfidenceClass::NoMatch
        } else {
            ConfidenceClass::Match
        }
    }

    pub fn is_match(self) -> bool {
        self.class() == ConfidenceClass::Match
    }

    pub fn is_error(self) -> bool {
        self.class() == ConfidenceClass::Error
    }
}

/// Undefined until the first locate call
impl Default for Confidence {
    fn default() -> Self {
        Self::ERROR
    }
}

impl TryFrom<f64> for Confidence {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("{value} is not a valid confidence"))
    }
}

impl From<Confidence> for f64 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class() {
            ConfidenceClass::Error => f.write_str("error"),
            ConfidenceClass::NoMatch => f.write_str("no match"),
            ConfidenceClass::Match => write!(f, "{:.3}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matched_clamps_into_unit_interval() {
        assert_eq!(Confidence::matched(1.7).value(), 1.0);
        assert_eq!(Confidence::matched(0.42).value(), 0.42);
        assert!(Confidence::matched(0.0).is_match());
        assert!(Confidence::matched(-3.0).is_match());
        assert!(Confidence::matched(f64::NAN).is_match());
    }

    #[test]
    fn test_strict_constructor_domain() {
        assert!(Confidence::new(-1.0).is_some());
        assert!(Confidence::new(0.0).is_some());
        assert!(Confidence::new(1.0).is_some());
        assert!(Confidence::new(-0.5).is_none());
        assert!(Confidence::new(1.01).is_none());
        assert!(Confidence::new(f64::NAN).is_none());
    }

    #[test]
    fn test_default_is_error() {
        assert_eq!(Confidence::default().class(), ConfidenceClass::Error);
    }

    #[test]
    fn test_deserialize_rejects_out_of_domain() {
        assert!(serde_json::from_str::<Confidence>("0.5").is_ok());
        assert!(serde_json::from_str::<Confidence>("2.0").is_err());
    }
}
