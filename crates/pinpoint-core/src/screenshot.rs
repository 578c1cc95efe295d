use anyhow::Context;
use image::{DynamicImage, GrayImage, RgbaImage};
use std::path::Path;

use crate::geometry::Point;

/// Immutable captured raster. Strategies only ever borrow it.
#[derive(Debug, Clone)]
pub struct Screenshot {
    image: RgbaImage,
}

impl Screenshot {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Load a screenshot previously written to disk
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let image = image::open(&path)
            .with_context(|| format!("Failed to open screenshot: {:?}", path.as_ref()))?;
        Ok(Self::from(image))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// True iff `0 <= x < width` and `0 <= y < height`
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as u32) < self.width()
            && (point.y as u32) < self.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn to_grayscale(&self) -> GrayImage {
        image::imageops::grayscale(&self.image)
    }
}

impl From<RgbaImage> for Screenshot {
    fn from(image: RgbaImage) -> Self {
        Self::new(image)
    }
}

impl From<DynamicImage> for Screenshot {
    fn from(image: DynamicImage) -> Self {
        Self::new(image.to_rgba8())
    }
}
