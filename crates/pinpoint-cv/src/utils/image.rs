//! Debug annotation of accepted points

use crate::Result;
use anyhow::Context;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use pinpoint_core::{Point, Screenshot};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Marker drawn over an accepted point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// RGBA
    pub color: [u8; 4],
    pub radius: u32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: [255, 0, 0, 255],
            radius: 15,
        }
    }
}

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Copy of the screenshot with a ringed crosshair at `point`.
    /// Matching never sees the copy.
    pub fn mark_point(screenshot: &Screenshot, point: Point, style: &MarkerStyle) -> RgbaImage {
        let mut canvas = screenshot.image().clone();
        let color = Rgba(style.color);
        let radius = style.radius as i32;
        let center = (point.x, point.y);

        // Four concentric rings give a ~4px outline
        for r in radius - 1..=radius + 2 {
            if r > 0 {
                draw_hollow_circle_mut(&mut canvas, center, r, color);
            }
        }

        let (x, y) = (point.x as f32, point.y as f32);
        let reach = (radius + 5) as f32;
        for offset in [0.0_f32, 1.0] {
            let (left, right) = ((x - reach, y + offset), (x + reach, y + offset));
            let (top, bottom) = ((x + offset, y - reach), (x + offset, y + reach));
            draw_line_segment_mut(&mut canvas, left, right, color);
            draw_line_segment_mut(&mut canvas, top, bottom, color);
        }

        canvas
    }

    /// Mark `point` and write `<prefix>_<YYYYmmdd_HHMMSS>.png` into `dir`
    pub fn save_debug_screenshot<P: AsRef<Path>>(
        screenshot: &Screenshot,
        point: Point,
        style: &MarkerStyle,
        dir: P,
        prefix: &str,
    ) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create screenshot directory: {:?}", dir))?;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("{prefix}_{timestamp}.png"));

        Self::mark_point(screenshot, point, style)
            .save(&path)
            .with_context(|| format!("Failed to save debug screenshot: {:?}", path))?;

        tracing::info!(path = %path.display(), %point, "debug screenshot saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_point_leaves_source_untouched() {
        let screenshot = Screenshot::new(RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255])));
        let marked =
            ImageUtils::mark_point(&screenshot, Point::new(50, 50), &MarkerStyle::default());

        assert_eq!(marked.dimensions(), (100, 100));
        // Crosshair arm and ring are red, far corner untouched
        assert_eq!(marked.get_pixel(50 + 10, 50), &Rgba([255, 0, 0, 255]));
        assert_eq!(marked.get_pixel(50, 50 - 15), &Rgba([255, 0, 0, 255]));
        assert_eq!(marked.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(screenshot.image().get_pixel(60, 50), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_marker_near_edge_is_clipped() {
        let screenshot = Screenshot::new(RgbaImage::new(20, 20));
        let marked =
            ImageUtils::mark_point(&screenshot, Point::new(0, 19), &MarkerStyle::default());
        assert_eq!(marked.dimensions(), (20, 20));
    }

    #[test]
    fn test_save_debug_screenshot() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let screenshot = Screenshot::new(RgbaImage::new(40, 30));

        let path = ImageUtils::save_debug_screenshot(
            &screenshot,
            Point::new(10, 10),
            &MarkerStyle::default(),
            dir.path().join("debug"),
            "located",
        )?;

        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("located_"));
        assert!(file_name.ends_with(".png"));
        assert_eq!(image::open(&path)?.to_rgba8().dimensions(), (40, 30));
        Ok(())
    }
}
