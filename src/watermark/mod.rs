//! Corner watermark applied to every upload.
//!
//! The watermark image is read and decoded once at startup into a
//! [`Watermark`], which is then shared read-only (behind an `Arc`) by every
//! request. Tests build their own `Watermark` from in-memory fixtures.
//!
//! # Configuration Example
//!
//! ```yaml
//! watermark:
//!   path: logo.png
//!   opacity: 0.78
//!   margin: 20
//!   shrink_divisor: 8
//!   shrink_width: 255
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod position;

use image::RgbaImage;
use std::path::Path;

use crate::constants::{
    DEFAULT_SHRINK_DIVISOR, DEFAULT_SHRINK_WIDTH, DEFAULT_WATERMARK_MARGIN,
    DEFAULT_WATERMARK_OPACITY,
};
use crate::imaging::{decode_png, ImageError};

pub use compositor::{composite, needs_shrink, place};
pub use config::WatermarkConfig;
pub use error::WatermarkError;
pub use position::{ImageDimensions, Placement};

/// How the watermark is sized and blended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkOptions {
    /// Opacity from 0.0 (invisible) to 1.0, multiplied into the mark's alpha
    pub opacity: f32,
    /// Distance from the right and bottom edges in pixels
    pub margin: u32,
    /// Shrink the mark when it is wider than base width / `shrink_divisor`
    pub shrink_divisor: u32,
    /// Width the mark is resized to
    pub shrink_width: u32,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            opacity: DEFAULT_WATERMARK_OPACITY,
            margin: DEFAULT_WATERMARK_MARGIN,
            shrink_divisor: DEFAULT_SHRINK_DIVISOR,
            shrink_width: DEFAULT_SHRINK_WIDTH,
        }
    }
}

impl WatermarkOptions {
    pub fn validate(&self) -> Result<(), WatermarkError> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(WatermarkError::ConfigError(format!(
                "opacity {} outside [0, 1]",
                self.opacity
            )));
        }
        if self.shrink_divisor == 0 {
            return Err(WatermarkError::ConfigError(
                "shrink_divisor must be at least 1".to_string(),
            ));
        }
        if self.shrink_width == 0 {
            return Err(WatermarkError::ConfigError(
                "shrink_width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Decoded watermark plus the options it is applied with.
#[derive(Clone)]
pub struct Watermark {
    image: RgbaImage,
    options: WatermarkOptions,
}

impl std::fmt::Debug for Watermark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watermark")
            .field("dimensions", &self.image.dimensions())
            .field("options", &self.options)
            .finish()
    }
}

impl Watermark {
    pub fn new(image: RgbaImage, options: WatermarkOptions) -> Result<Self, WatermarkError> {
        options.validate()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(WatermarkError::DecodeError(ImageError::decode_failed(
                "watermark has zero area",
            )));
        }
        Ok(Self { image, options })
    }

    /// Decode PNG bytes into a watermark
    pub fn from_png_bytes(data: &[u8], options: WatermarkOptions) -> Result<Self, WatermarkError> {
        let image = decode_png(data)?;
        Self::new(image, options)
    }

    /// Read and decode a PNG file
    pub fn from_path(path: impl AsRef<Path>, options: WatermarkOptions) -> Result<Self, WatermarkError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| WatermarkError::ReadError(format!("{}: {}", path.display(), e)))?;

        let watermark = Self::from_png_bytes(&data, options)?;
        tracing::info!(
            path = %path.display(),
            width = watermark.image.width(),
            height = watermark.image.height(),
            opacity = options.opacity,
            "Watermark loaded"
        );
        Ok(watermark)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn options(&self) -> &WatermarkOptions {
        &self.options
    }

    /// Stamp this watermark onto `base`
    pub fn apply(&self, base: RgbaImage) -> Result<RgbaImage, ImageError> {
        composite(base, &self.image, &self.options)
    }
}
