//! Image codec and geometry primitives
//!
//! The building blocks of the upload pipeline:
//! - [`decoder`]: bytes → RGBA grid + detected [`FormatTag`]
//! - [`resizer`]: Lanczos3 resize to a target width, aspect preserved
//! - [`encoder`]: RGBA grid → bytes in the container matching the tag
//!
//! All functions are pure and synchronous; they are safe to call from many
//! threads at once as long as each call owns its own grid.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod resizer;

pub use decoder::{decode, decode_png, validate_dimensions};
pub use encoder::{encode, EncodedImage, EncoderFactory, EncoderQuality, ImageEncoder};
pub use error::ImageError;
pub use format::FormatTag;
pub use resizer::{resize, resize_exact, resize_within, scaled_height};

/// In-memory decoded image: row-major RGBA8 samples, origin top-left
pub type PixelGrid = image::RgbaImage;
