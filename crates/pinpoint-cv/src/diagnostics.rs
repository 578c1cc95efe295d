//! Diagnostics sinks
//!
//! The engine and strategies report what they do through an injected sink
//! rather than a global logger, so callers decide where the trail ends up.

use pinpoint_core::{Confidence, DetectionError, Point};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::strategy::StrategyKind;

pub type SharedSink = Arc<dyn DiagnosticsSink>;

/// Something that happened while grounding a target
#[derive(Debug)]
pub enum GroundingEvent<'a> {
    StrategyRegistered {
        strategy: &'a str,
        kind: StrategyKind,
        position: usize,
    },
    SearchStarted {
        target: &'a str,
        strategies: usize,
    },
    StrategyAttempt {
        strategy: &'a str,
        index: usize,
        total: usize,
    },
    StrategyMatched {
        strategy: &'a str,
        point: Point,
        confidence: Confidence,
    },
    StrategyMissed {
        strategy: &'a str,
    },
    StrategyRejected {
        strategy: &'a str,
        point: Point,
        width: u32,
        height: u32,
    },
    StrategyFailed {
        strategy: &'a str,
        error: &'a DetectionError,
    },
    SearchExhausted {
        target: &'a str,
        strategies: usize,
    },
    ThresholdAttempt {
        strategy: &'a str,
        attempt: usize,
        total: usize,
        threshold: f64,
    },
    TextCandidate {
        strategy: &'a str,
        text: &'a str,
        confidence: f64,
        score: f64,
    },
    RegionGrounded {
        strategy: &'a str,
        phrase: &'a str,
        region: usize,
        total: usize,
        point: Point,
    },
    RegionSkipped {
        strategy: &'a str,
        region: usize,
        total: usize,
    },
}

impl fmt::Display for GroundingEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GroundingEvent::*;
        match self {
            StrategyRegistered { strategy, kind, position } => {
                write!(f, "registered {kind} strategy '{strategy}' at position {position}")
            }
            SearchStarted { target, strategies } => {
                write!(f, "locating '{target}' with {strategies} strategies")
            }
            StrategyAttempt { strategy, index, total } => {
                write!(f, "trying strategy {index}/{total}: {strategy}")
            }
            StrategyMatched { strategy, point, confidence } => {
                write!(f, "strategy '{strategy}' matched at {point} (confidence: {confidence})")
            }
            StrategyMissed { strategy } => write!(f, "strategy '{strategy}' found no match"),
            StrategyRejected { strategy, point, width, height } => write!(
                f,
                "strategy '{strategy}' returned {point}, outside {width}x{height} screenshot"
            ),
            StrategyFailed { strategy, error } => {
                write!(f, "strategy '{strategy}' failed: {error}")
            }
            SearchExhausted { target, strategies } => {
                write!(f, "all {strategies} strategies failed to locate '{target}'")
            }
            ThresholdAttempt { strategy, attempt, total, threshold } => write!(
                f,
                "strategy '{strategy}' attempt {attempt}/{total}: threshold={threshold}"
            ),
            TextCandidate { strategy, text, confidence, score } => write!(
                f,
                "strategy '{strategy}' candidate '{text}' \
                 (confidence: {confidence:.3}, score: {score:.3})"
            ),
            RegionGrounded { strategy, phrase, region, total, point } => write!(
                f,
                "strategy '{strategy}' grounded '{phrase}' to region {region}/{total} at {point}"
            ),
            RegionSkipped { strategy, region, total } => {
                write!(f, "strategy '{strategy}' skipped region {region}/{total}: no usable centre")
            }
        }
    }
}

pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, event: &GroundingEvent<'_>);
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&self, event: &GroundingEvent<'_>) {
        use GroundingEvent::*;
        match event {
            StrategyRegistered { strategy, kind, position } => {
                tracing::debug!(strategy, %kind, position, "strategy registered")
            }
            SearchStarted { target, strategies } => {
                tracing::info!(query = %target, strategies, "locating target")
            }
            StrategyAttempt { strategy, index, total } => {
                tracing::debug!(strategy, index, total, "trying strategy")
            }
            StrategyMatched { strategy, point, confidence } => {
                tracing::info!(strategy, %point, %confidence, "strategy matched")
            }
            StrategyMissed { strategy } => tracing::debug!(strategy, "no match"),
            StrategyRejected { strategy, point, width, height } => {
                tracing::warn!(strategy, %point, width, height, "match outside screenshot bounds")
            }
            StrategyFailed { strategy, error } => {
                tracing::warn!(strategy, error = %error, "strategy failed")
            }
            SearchExhausted { target, strategies } => {
                tracing::warn!(query = %target, strategies, "all strategies failed")
            }
            ThresholdAttempt { strategy, attempt, total, threshold } => {
                tracing::debug!(strategy, attempt, total, threshold, "threshold attempt")
            }
            TextCandidate { strategy, text, confidence, score } => {
                tracing::debug!(strategy, text, confidence, score, "text candidate")
            }
            RegionGrounded { strategy, phrase, region, total, point } => {
                tracing::debug!(strategy, phrase, region, total, %point, "region grounded")
            }
            RegionSkipped { strategy, region, total } => {
                tracing::debug!(strategy, region, total, "region has no usable centre")
            }
        }
    }
}

/// Drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn report(&self, _event: &GroundingEvent<'_>) {}
}

/// Keeps rendered events in memory, for audit trails and tests
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl DiagnosticsSink for MemorySink {
    fn report(&self, event: &GroundingEvent<'_>) {
        let line = event.to_string();
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}

pub fn tracing_sink() -> SharedSink {
    Arc::new(TracingSink)
}
