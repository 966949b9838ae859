//! Image pipeline error types
//!
//! Every stage reports through [`ImageError`]; the HTTP layer turns it into a
//! status code with [`ImageError::to_http_status`].

use std::fmt;

/// Errors that can occur while transforming an uploaded image
#[derive(Debug, Clone)]
pub enum ImageError {
    // === Decoding Errors ===
    /// Container format is recognized but cannot be handled
    UnsupportedFormat { format: String },
    /// Bytes are not an image, or the image is truncated/corrupt
    DecodeFailed { message: String },
    /// Decoded dimensions exceed safety limits (image bomb protection)
    ImageBombDetected {
        width: u32,
        height: u32,
        pixels: u64,
        max_pixels: u64,
    },
    /// Input file size exceeds limit
    FileTooLarge { size: usize, max_size: usize },

    // === Processing Errors ===
    /// Requested or encountered dimensions are invalid
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: String,
    },
    /// Resize operation failed
    ResizeFailed { message: String },
    /// Watermark could not be composited
    CompositeFailed { message: String },
    /// Encoding to output format failed
    EncodeFailed { format: String, message: String },

    // === Storage Errors ===
    /// Destination could not be written
    WriteFailed {
        destination: String,
        message: String,
    },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::UnsupportedFormat { format } => {
                write!(f, "Unsupported image format: {}", format)
            }
            ImageError::DecodeFailed { message } => {
                write!(f, "Failed to decode image: {}", message)
            }
            ImageError::ImageBombDetected {
                width,
                height,
                pixels,
                max_pixels,
            } => {
                write!(
                    f,
                    "Image dimensions {}x{} ({} pixels) exceed limit of {} pixels",
                    width, height, pixels, max_pixels
                )
            }
            ImageError::FileTooLarge { size, max_size } => {
                write!(
                    f,
                    "File size {} bytes exceeds maximum {} bytes",
                    size, max_size
                )
            }
            ImageError::InvalidDimensions {
                width,
                height,
                reason,
            } => {
                write!(f, "Invalid dimensions {}x{}: {}", width, height, reason)
            }
            ImageError::ResizeFailed { message } => {
                write!(f, "Resize failed: {}", message)
            }
            ImageError::CompositeFailed { message } => {
                write!(f, "Failed to composite watermark: {}", message)
            }
            ImageError::EncodeFailed { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
            ImageError::WriteFailed {
                destination,
                message,
            } => {
                write!(f, "Failed to write {}: {}", destination, message)
            }
        }
    }
}

impl std::error::Error for ImageError {}

impl ImageError {
    /// Maps image errors to HTTP status codes
    ///
    /// Status mapping:
    /// - UnsupportedFormat → 415 (Unsupported Media Type)
    /// - DecodeFailed, ImageBombDetected, InvalidDimensions → 400 (Bad Request)
    /// - FileTooLarge → 413 (Payload Too Large)
    /// - ResizeFailed, CompositeFailed, EncodeFailed, WriteFailed → 500
    pub fn to_http_status(&self) -> u16 {
        match self {
            ImageError::UnsupportedFormat { .. } => 415,

            ImageError::DecodeFailed { .. }
            | ImageError::ImageBombDetected { .. }
            | ImageError::InvalidDimensions { .. } => 400,

            ImageError::FileTooLarge { .. } => 413,

            ImageError::ResizeFailed { .. }
            | ImageError::CompositeFailed { .. }
            | ImageError::EncodeFailed { .. }
            | ImageError::WriteFailed { .. } => 500,
        }
    }

    /// True when the caller must change the input rather than retry
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.to_http_status())
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        ImageError::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        ImageError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        ImageError::ResizeFailed {
            message: message.into(),
        }
    }

    pub fn composite_failed(message: impl Into<String>) -> Self {
        ImageError::CompositeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        ImageError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn write_failed(destination: impl Into<String>, message: impl Into<String>) -> Self {
        ImageError::WriteFailed {
            destination: destination.into(),
            message: message.into(),
        }
    }

    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        ImageError::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    pub fn image_bomb(width: u32, height: u32, max_pixels: u64) -> Self {
        ImageError::ImageBombDetected {
            width,
            height,
            pixels: width as u64 * height as u64,
            max_pixels,
        }
    }
}
