//! Watermark configuration.
//!
//! ```yaml
//! watermark:
//!   path: logo.png
//!   opacity: 0.78
//! ```

use serde::{Deserialize, Serialize};

use super::WatermarkOptions;
use crate::constants::{
    DEFAULT_SHRINK_DIVISOR, DEFAULT_SHRINK_WIDTH, DEFAULT_WATERMARK_MARGIN,
    DEFAULT_WATERMARK_OPACITY, DEFAULT_WATERMARK_PATH,
};

fn default_path() -> String {
    DEFAULT_WATERMARK_PATH.to_string()
}

fn default_opacity() -> f32 {
    DEFAULT_WATERMARK_OPACITY
}

fn default_margin() -> u32 {
    DEFAULT_WATERMARK_MARGIN
}

fn default_shrink_divisor() -> u32 {
    DEFAULT_SHRINK_DIVISOR
}

fn default_shrink_width() -> u32 {
    DEFAULT_SHRINK_WIDTH
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkConfig {
    /// PNG file read once at startup
    #[serde(default = "default_path")]
    pub path: String,

    /// 0.0 - 1.0 (default: 0.78)
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Pixels from the right and bottom edges
    #[serde(default = "default_margin")]
    pub margin: u32,

    #[serde(default = "default_shrink_divisor")]
    pub shrink_divisor: u32,

    #[serde(default = "default_shrink_width")]
    pub shrink_width: u32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            opacity: default_opacity(),
            margin: default_margin(),
            shrink_divisor: default_shrink_divisor(),
            shrink_width: default_shrink_width(),
        }
    }
}

impl WatermarkConfig {
    pub fn to_options(&self) -> WatermarkOptions {
        WatermarkOptions {
            opacity: self.opacity,
            margin: self.margin,
            shrink_divisor: self.shrink_divisor,
            shrink_width: self.shrink_width,
        }
    }
}
