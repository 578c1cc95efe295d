//! Scripted backends shared by the integration tests
#![allow(dead_code)]

use image::{GrayImage, Luma, RgbaImage};
use pinpoint_cv::traits::{PhraseGrounder, TemplateMatchable, TextDetector};
use pinpoint_cv::{
    BoundingBox, DetectionError, Point, Polygon, Screenshot, Template, TemplateMatch, TextDetection,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn blank_screen(width: u32, height: u32) -> Screenshot {
    Screenshot::new(RgbaImage::new(width, height))
}

pub fn small_template() -> Template {
    Template::new("icon".to_string(), GrayImage::from_pixel(4, 4, Luma([128])))
}

/// Grounds every phrase to a single point
pub struct PointGrounder(pub Point);

impl PhraseGrounder for PointGrounder {
    fn ground_phrase(
        &self,
        _screenshot: &Screenshot,
        _phrase: &str,
    ) -> Result<Vec<Polygon>, DetectionError> {
        let (x, y) = (self.0.x as f64, self.0.y as f64);
        Ok(vec![Polygon::from_bounds(x, y, x, y)])
    }
}

pub struct FailingDetector;

impl TextDetector for FailingDetector {
    fn detect_text(&self, _screenshot: &Screenshot) -> Result<Vec<TextDetection>, DetectionError> {
        Err(DetectionError::Unavailable("ocr engine not initialised".into()))
    }
}

pub struct PanickingGrounder;

impl PhraseGrounder for PanickingGrounder {
    fn ground_phrase(
        &self,
        _screenshot: &Screenshot,
        _phrase: &str,
    ) -> Result<Vec<Polygon>, DetectionError> {
        panic!("model weights corrupted")
    }
}

/// Matches only at thresholds at or below `succeeds_at`, counting every call
pub struct CountingMatcher {
    pub succeeds_at: f64,
    pub bbox: BoundingBox,
    pub calls: Arc<AtomicUsize>,
}

impl CountingMatcher {
    pub fn new(succeeds_at: f64, bbox: BoundingBox) -> Self {
        Self {
            succeeds_at,
            bbox,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TemplateMatchable for CountingMatcher {
    fn match_template(
        &self,
        _screenshot: &Screenshot,
        _template: &Template,
        threshold: f64,
    ) -> Result<Option<TemplateMatch>, DetectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if threshold <= self.succeeds_at {
            Ok(Some(TemplateMatch::new(self.bbox, Some(threshold))))
        } else {
            Ok(None)
        }
    }
}

pub struct UnreachableMatcher;

impl TemplateMatchable for UnreachableMatcher {
    fn match_template(
        &self,
        _screenshot: &Screenshot,
        _template: &Template,
        _threshold: f64,
    ) -> Result<Option<TemplateMatch>, DetectionError> {
        Err(DetectionError::Unavailable("display not accessible".into()))
    }
}

pub fn text_at(x: f64, y: f64, text: &str, confidence: f64) -> TextDetection {
    TextDetection::new(Polygon::from_bounds(x, y, x + 40.0, y + 20.0), text, confidence)
}
