//! String similarity used by fuzzy OCR matching

use crate::traits::TextSimilarity;
use serde::{Deserialize, Serialize};
use similar::TextDiff;
use std::sync::Arc;

/// Character-level diff ratio `2 * M / (|a| + |b|)`, where `M` is the number
/// of characters the diff keeps unchanged. Two empty strings are identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl SequenceRatio {
    pub fn ratio(a: &str, b: &str) -> f64 {
        f64::from(TextDiff::from_chars(a, b).ratio())
    }
}

impl TextSimilarity for SequenceRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        Self::ratio(a, b)
    }

    fn name(&self) -> &'static str {
        "sequence_ratio"
    }
}

/// Coarse fallback: `0.9` if either string contains the other, else `0`
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainmentHeuristic;

impl TextSimilarity for ContainmentHeuristic {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        if a.contains(b) || b.contains(a) {
            0.9
        } else {
            0.0
        }
    }

    fn name(&self) -> &'static str {
        "containment"
    }
}

/// Built-in metric selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    #[default]
    SequenceRatio,
    Containment,
}

impl SimilarityMetric {
    pub fn build(self) -> Arc<dyn TextSimilarity> {
        match self {
            SimilarityMetric::SequenceRatio => Arc::new(SequenceRatio),
            SimilarityMetric::Containment => Arc::new(ContainmentHeuristic),
        }
    }
}
