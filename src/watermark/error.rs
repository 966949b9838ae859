//! Watermark loading errors.
//!
//! Raised while building the process-wide [`super::Watermark`] at startup.
//! Errors while stamping an upload are reported as `ImageError`.

use std::fmt;

use crate::imaging::ImageError;

/// Errors that can occur while loading the watermark.
#[derive(Debug)]
pub enum WatermarkError {
    /// Failed to read watermark image from its source
    ReadError(String),

    /// Failed to decode watermark image
    DecodeError(ImageError),

    /// Invalid configuration
    ConfigError(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadError(msg) => write!(f, "Failed to read watermark: {}", msg),
            Self::DecodeError(err) => write!(f, "Failed to decode watermark image: {}", err),
            Self::ConfigError(msg) => write!(f, "Watermark configuration error: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DecodeError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ImageError> for WatermarkError {
    fn from(err: ImageError) -> Self {
        Self::DecodeError(err)
    }
}
