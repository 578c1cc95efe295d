// tests/strategy_tests.rs
mod common;

use common::*;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use pinpoint_cv::strategy::{
    FuzzyConfig, LocateOutcome, OcrConfig, Strategy, ThresholdLadder, VisionConfig,
};
use pinpoint_cv::{
    AdaptiveTemplateStrategy, BoundingBox, Confidence, EngineBuilder, FuzzyOcrStrategy,
    GroundingConfig, GroundingStrategy, LocateRequest, MemorySink, MultiStrategyEngine,
    OcrStrategy, Point, RecordedTextDetector, Screenshot, StrategyKind, TemplateStrategy,
    VisionStrategy,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

#[test]
fn test_adaptive_ladder_halts_at_first_matching_rung() {
    let matcher = Arc::new(CountingMatcher::new(0.7, BoundingBox::new(20, 30, 10, 10)));
    let sink = Arc::new(MemorySink::new());
    let base = TemplateStrategy::new(small_template(), 0.9, matcher.clone()).unwrap();
    let ladder = ThresholdLadder::new(vec![0.9, 0.8, 0.7, 0.6, 0.5]).unwrap();
    let mut adaptive = AdaptiveTemplateStrategy::new(base, ladder)
        .unwrap()
        .with_sink(sink.clone());

    let outcome = adaptive.locate(&blank_screen(100, 100), &LocateRequest::default());
    assert_eq!(outcome.point(), Some(Point::new(25, 35)));
    assert_eq!(matcher.calls(), 3);
    assert_eq!(adaptive.last_matched_threshold(), Some(0.7));
    assert_eq!(adaptive.confidence().value(), 0.7);
    assert!(sink.contains("attempt 3/5: threshold=0.7"));
    assert!(!sink.contains("attempt 4/5"));
}

#[test]
fn test_adaptive_ladder_exhaustion_and_failure() {
    let never = Arc::new(CountingMatcher::new(0.1, BoundingBox::new(0, 0, 5, 5)));
    let base = TemplateStrategy::new(small_template(), 0.9, never.clone()).unwrap();
    let ladder = ThresholdLadder::new(vec![0.9, 0.8, 0.7]).unwrap();
    let mut adaptive = AdaptiveTemplateStrategy::new(base, ladder).unwrap();

    assert!(matches!(
        adaptive.locate(&blank_screen(50, 50), &LocateRequest::default()),
        LocateOutcome::NotFound
    ));
    assert_eq!(never.calls(), 3);
    assert_eq!(adaptive.confidence(), Confidence::NO_MATCH);

    let base = TemplateStrategy::new(small_template(), 0.9, Arc::new(UnreachableMatcher)).unwrap();
    let mut adaptive = AdaptiveTemplateStrategy::new(base, ThresholdLadder::default()).unwrap();
    assert!(matches!(
        adaptive.locate(&blank_screen(50, 50), &LocateRequest::default()),
        LocateOutcome::Failed(_)
    ));
    assert!(adaptive.confidence().is_error());
}

#[test]
fn test_fuzzy_fusion_prefers_exact_text_over_confident_misread() {
    let detector = Arc::new(RecordedTextDetector::new(vec![
        text_at(10.0, 10.0, "Save", 0.95),
        text_at(100.0, 10.0, "S4ve", 0.99),
    ]));
    let ocr = OcrStrategy::new(detector, OcrConfig::default()).unwrap();
    let fuzzy = FuzzyOcrStrategy::new(ocr, &FuzzyConfig::default()).unwrap();

    let mut engine = MultiStrategyEngine::new().with_strategy(fuzzy).unwrap();
    let result = engine
        .locate(&blank_screen(200, 100), &LocateRequest::new("Save"))
        .unwrap();

    assert_eq!(result.point, Point::new(30, 20));
    assert_eq!(result.kind, StrategyKind::FuzzyOcr);
    assert!((result.confidence.value() - 0.95).abs() < 1e-9);
}

fn in_domain(confidence: Confidence) -> bool {
    let v = confidence.value();
    v == -1.0 || v == 0.0 || (v > 0.0 && v <= 1.0)
}

#[test]
fn test_confidence_stays_in_domain_for_every_variant() {
    let screenshot = blank_screen(120, 80);
    let detector = Arc::new(RecordedTextDetector::new(vec![text_at(10.0, 10.0, "Save", 1.0)]));
    let matcher = Arc::new(CountingMatcher::new(0.95, BoundingBox::new(1, 1, 4, 4)));

    let mut strategies: Vec<Strategy> = vec![
        TemplateStrategy::new(small_template(), 0.5, matcher.clone()).unwrap().into(),
        TemplateStrategy::new(small_template(), 0.5, Arc::new(UnreachableMatcher))
            .unwrap()
            .into(),
        AdaptiveTemplateStrategy::new(
            TemplateStrategy::new(small_template(), 0.9, matcher).unwrap(),
            ThresholdLadder::default(),
        )
        .unwrap()
        .into(),
        OcrStrategy::new(detector.clone(), OcrConfig::default()).unwrap().into(),
        OcrStrategy::new(Arc::new(FailingDetector), OcrConfig::default()).unwrap().into(),
        FuzzyOcrStrategy::new(
            OcrStrategy::new(detector, OcrConfig::default()).unwrap(),
            &FuzzyConfig::default(),
        )
        .unwrap()
        .into(),
        VisionStrategy::new(Arc::new(PointGrounder(Point::new(3, 3))), VisionConfig::default())
            .unwrap()
            .into(),
    ];

    let requests = [
        LocateRequest::new("Save"),
        LocateRequest::new("Nothing here"),
        LocateRequest::new(""),
        LocateRequest::new("Save").with_threshold(3.0),
        LocateRequest::new("Save").with_threshold(1.0),
    ];

    for strategy in &mut strategies {
        assert!(strategy.confidence().is_error(), "{strategy:?} before any call");
        for request in &requests {
            strategy.locate(&screenshot, request);
            assert!(in_domain(strategy.confidence()), "{strategy:?} after {request:?}");
        }
    }
}

#[test]
fn test_template_grounding_from_toml_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let gray = GrayImage::from_fn(160, 120, |_, _| Luma([rng.gen_range(0..=255u8)]));

    let icon = image::imageops::crop_imm(&gray, 52, 40, 16, 12).to_image();
    icon.save(dir.path().join("notepad_icon.png")).unwrap();

    let screen = RgbaImage::from_fn(160, 120, |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Rgba([v, v, v, 255])
    });
    let screenshot = Screenshot::new(screen);

    let toml = format!(
        "strategy_order = [\"adaptive_template\", \"vision\"]\n\n\
         [templates]\ndirs = [{:?}]\nname = \"Notepad_Icon\"\n",
        dir.path().display().to_string()
    );
    let config = GroundingConfig::from_toml_str(&toml).unwrap();

    let mut engine = EngineBuilder::new(config)
        .phrase_grounder(Arc::new(PointGrounder(Point::new(1, 1))))
        .build()
        .unwrap();

    let result = engine.locate(&screenshot, &LocateRequest::new("notepad")).unwrap();
    assert_eq!(result.strategy, "AdaptiveTemplateMatching");
    assert_eq!(result.point, Point::new(60, 46));
    assert!(result.confidence.value() > 0.9);
}
