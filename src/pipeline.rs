//! One-shot grounding run: configuration, backends, locate, annotate

use anyhow::{bail, Context};
use pinpoint_cv::{
    grounding::{EngineBuilder, GroundingConfig, LocateResult},
    strategy::StrategyKind,
    template::TemplateLoader,
    ImageUtils, LocateRequest, RecordedTextDetector, Result, Screenshot,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything one run needs, independent of how it was gathered
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub screenshot: PathBuf,
    pub request: LocateRequest,
    pub config: Option<PathBuf>,
    pub strategies: Vec<StrategyKind>,
    pub detections: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub template_dirs: Vec<PathBuf>,
    pub annotate: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct Outcome {
    pub result: Option<LocateResult>,
    pub annotated: Option<PathBuf>,
}

pub fn run(options: &PipelineOptions) -> Result<Outcome> {
    let mut config = match &options.config {
        Some(path) => GroundingConfig::load(path)?,
        None => GroundingConfig::default(),
    };
    if !options.strategies.is_empty() {
        config.strategy_order = options.strategies.clone();
    }
    if !options.template_dirs.is_empty() {
        config.templates.dirs = options.template_dirs.clone();
    }

    let detector = match &options.detections {
        Some(path) => Some(Arc::new(RecordedTextDetector::from_json_file(path)?)),
        None => None,
    };
    drop_unbacked_strategies(&mut config, detector.is_some());
    if config.strategy_order.is_empty() {
        bail!("No usable strategies: supply --detections for OCR or a template to match");
    }

    let mut builder = EngineBuilder::new(config.clone());
    if let Some(detector) = detector {
        builder = builder.text_detector(detector);
    }
    if let Some(path) = &options.template {
        builder = builder.template(TemplateLoader::load_path(path)?);
    }
    let mut engine = builder.build().context("Failed to set up grounding engine")?;

    let screenshot = Screenshot::open(&options.screenshot)?;
    tracing::info!(
        path = %options.screenshot.display(),
        width = screenshot.width(),
        height = screenshot.height(),
        "screenshot loaded"
    );

    let result = engine.locate(&screenshot, &options.request);

    let annotate_dir = options
        .annotate
        .clone()
        .or_else(|| config.debug.save_screenshots.then(|| config.debug.output_dir.clone()));
    let annotated = match (&result, annotate_dir) {
        (Some(found), Some(dir)) => Some(ImageUtils::save_debug_screenshot(
            &screenshot,
            found.point,
            &config.debug.marker,
            dir,
            "located",
        )?),
        _ => None,
    };

    Ok(Outcome { result, annotated })
}

/// The CLI ships no OCR or vision model; strategies without a backend are skipped
fn drop_unbacked_strategies(config: &mut GroundingConfig, has_detections: bool) {
    config.strategy_order.retain(|kind| {
        let backed = match kind {
            StrategyKind::Template | StrategyKind::AdaptiveTemplate => true,
            StrategyKind::Ocr | StrategyKind::FuzzyOcr => has_detections,
            StrategyKind::Vision => false,
        };
        if !backed {
            tracing::warn!(strategy = %kind, "no backend available, skipping strategy");
        }
        backed
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_drop_unbacked_strategies() {
        let mut config = GroundingConfig::default();
        config.strategy_order = vec![
            StrategyKind::Template,
            StrategyKind::Ocr,
            StrategyKind::Vision,
            StrategyKind::FuzzyOcr,
        ];

        drop_unbacked_strategies(&mut config, false);
        assert_eq!(config.strategy_order, [StrategyKind::Template]);
    }

    #[test]
    fn test_run_with_recorded_detections() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let screenshot_path = dir.path().join("screen.png");
        RgbaImage::from_pixel(200, 100, Rgba([30, 30, 30, 255])).save(&screenshot_path)?;

        let detections_path = dir.path().join("ocr.json");
        std::fs::write(
            &detections_path,
            r#"[
                {"polygon": [[100,40],[140,40],[140,60],[100,60]],
                 "text": "Notepad", "confidence": 0.92}
            ]"#,
        )?;

        let options = PipelineOptions {
            screenshot: screenshot_path,
            request: LocateRequest::new("notepad"),
            detections: Some(detections_path),
            strategies: vec![StrategyKind::Ocr],
            annotate: Some(dir.path().join("debug")),
            ..Default::default()
        };

        let outcome = run(&options)?;
        let result = outcome.result.expect("target located");
        assert_eq!((result.point.x, result.point.y), (120, 50));
        assert_eq!(result.strategy, "OCR");
        assert!(outcome.annotated.is_some_and(|p| p.exists()));
        Ok(())
    }

    #[test]
    fn test_run_without_any_backend_fails() {
        let options = PipelineOptions {
            screenshot: "missing.png".into(),
            request: LocateRequest::new("x"),
            strategies: vec![StrategyKind::FuzzyOcr],
            ..Default::default()
        };
        assert!(run(&options).is_err());
    }
}
