//! Template matching on grayscale screenshots using imageproc

use super::{MatchingMethod, Template, TemplateConfig};
use crate::traits::TemplateMatchable;
use image::GrayImage;
use image::imageops::{self, FilterType};
use pinpoint_core::{BoundingBox, DetectionError, Screenshot, TemplateMatch};

/// Normalized correlation matcher, optionally multi-scale
#[derive(Debug, Clone)]
pub struct NccMatcher {
    method: MatchingMethod,
    scale_factors: Vec<f64>,
}

/// Best location for one scaled template
#[derive(Debug, Clone, Copy)]
struct ScaledMatch {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    score: f64,
}

impl NccMatcher {
    /// Create new template matcher
    pub fn new(method: MatchingMethod, scale_factors: Vec<f64>) -> Self {
        let scale_factors = if scale_factors.is_empty() {
            vec![1.0]
        } else {
            scale_factors
        };
        Self {
            method,
            scale_factors,
        }
    }

    pub fn from_config(config: &TemplateConfig) -> Self {
        Self::new(config.matching_method, config.scale_factors.clone())
    }

    /// Best score over every scale, regardless of threshold
    fn best_match(&self, image: &GrayImage, template: &GrayImage) -> Option<ScaledMatch> {
        let mut best: Option<ScaledMatch> = None;

        for &scale in &self.scale_factors {
            let scaled = if (scale - 1.0).abs() < f64::EPSILON {
                template.clone()
            } else {
                self.scale_template(template, scale)
            };

            // imageproc requires the template to fit inside the image
            if scaled.width() == 0
                || scaled.height() == 0
                || scaled.width() > image.width()
                || scaled.height() > image.height()
            {
                continue;
            }

            if let Some(candidate) = self.match_single_scale(image, &scaled) {
                if best.is_none_or(|b| candidate.score > b.score) {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    /// Core template matching at single scale
    fn match_single_scale(&self, image: &GrayImage, template: &GrayImage) -> Option<ScaledMatch> {
        #[cfg(feature = "parallel")]
        let result = imageproc::template_matching::match_template_parallel(
            image,
            template,
            self.method.to_imageproc(),
        );

        #[cfg(not(feature = "parallel"))]
        let result = imageproc::template_matching::match_template(
            image,
            template,
            self.method.to_imageproc(),
        );

        let mut best: Option<ScaledMatch> = None;
        for (x, y, pixel) in result.enumerate_pixels() {
            let raw = pixel[0] as f64;
            if !raw.is_finite() {
                continue;
            }

            // Normalize inverted methods to "higher is better"
            let score = if self.method.is_inverted() { 1.0 - raw } else { raw };
            if best.is_none_or(|b| score > b.score) {
                best = Some(ScaledMatch {
                    x,
                    y,
                    width: template.width(),
                    height: template.height(),
                    score: score.clamp(0.0, 1.0),
                });
            }
        }

        best
    }

    /// Scale template
    fn scale_template(&self, template: &GrayImage, scale: f64) -> GrayImage {
        let width = (template.width() as f64 * scale) as u32;
        let height = (template.height() as f64 * scale) as u32;
        if width == 0 || height == 0 {
            return GrayImage::new(0, 0);
        }
        imageops::resize(template, width, height, FilterType::Triangle)
    }
}

impl TemplateMatchable for NccMatcher {
    fn match_template(
        &self,
        screenshot: &Screenshot,
        template: &Template,
        threshold: f64,
    ) -> Result<Option<TemplateMatch>, DetectionError> {
        if template.image.width() == 0 || template.image.height() == 0 {
            return Err(DetectionError::MalformedInput(format!(
                "template '{}' is empty",
                template.name
            )));
        }

        let image = screenshot.to_grayscale();
        let found = self
            .best_match(&image, &template.image)
            .filter(|m| m.score >= threshold)
            .map(|m| {
                TemplateMatch::new(
                    BoundingBox::new(m.x as i32, m.y as i32, m.width as i32, m.height as i32),
                    Some(m.score),
                )
            });

        Ok(found)
    }
}

impl Default for NccMatcher {
    fn default() -> Self {
        Self::from_config(&TemplateConfig::default())
    }
}
