//! Replays text detections produced by an external OCR run

use crate::Result;
use crate::traits::TextDetector;
use anyhow::Context;
use pinpoint_core::{DetectionError, Screenshot, TextDetection};
use std::path::Path;

/// Text detector backed by a fixed list of detections.
///
/// The JSON layout is a list of `{"polygon": [[x, y], ...], "text": "...",
/// "confidence": 0.93}` objects, in detector output order.
#[derive(Debug, Clone, Default)]
pub struct RecordedTextDetector {
    detections: Vec<TextDetection>,
}

impl RecordedTextDetector {
    pub fn new(detections: Vec<TextDetection>) -> Self {
        Self { detections }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let detections: Vec<TextDetection> =
            serde_json::from_str(json).context("Failed to parse recorded text detections")?;
        Ok(Self::new(detections))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read detections: {:?}", path.as_ref()))?;
        Self::from_json_str(&json)
    }

    pub fn detections(&self) -> &[TextDetection] {
        &self.detections
    }
}

impl TextDetector for RecordedTextDetector {
    fn detect_text(
        &self,
        _screenshot: &Screenshot,
    ) -> std::result::Result<Vec<TextDetection>, DetectionError> {
        Ok(self.detections.clone())
    }
}
