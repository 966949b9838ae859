use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_JPEG_QUALITY, DEFAULT_MAX_SOURCE_PIXELS, DEFAULT_MAX_TARGET_WIDTH,
    DEFAULT_TARGET_WIDTH,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Width uploads are resized to when the request does not ask otherwise
    #[serde(default = "default_target_width")]
    pub target_width: u32,

    /// Largest width a request may ask for
    #[serde(default = "default_max_target_width")]
    pub max_target_width: u32,

    /// Quality for JPEG output (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Decoded and resized images above this pixel count are rejected
    #[serde(default = "default_max_source_pixels")]
    pub max_source_pixels: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            max_target_width: DEFAULT_MAX_TARGET_WIDTH,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_source_pixels: DEFAULT_MAX_SOURCE_PIXELS,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.target_width == 0 {
            return Err("pipeline.target_width must be greater than 0".to_string());
        }
        if self.max_target_width < self.target_width {
            return Err(format!(
                "pipeline.max_target_width ({}) is smaller than target_width ({})",
                self.max_target_width, self.target_width
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!(
                "pipeline.jpeg_quality must be 1-100, got {}",
                self.jpeg_quality
            ));
        }
        if self.max_source_pixels == 0 {
            return Err("pipeline.max_source_pixels must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_target_width() -> u32 {
    DEFAULT_TARGET_WIDTH
}

fn default_max_target_width() -> u32 {
    DEFAULT_MAX_TARGET_WIDTH
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_max_source_pixels() -> u64 {
    DEFAULT_MAX_SOURCE_PIXELS
}
