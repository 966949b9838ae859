//! Image encoder abstraction
//!
//! One encoder per [`FormatTag`], selected through [`EncoderFactory`]. Adding
//! a format means adding a tag variant and one `ImageEncoder` impl.

use image::codecs::bmp::BmpEncoder as ImageBmpEncoder;
use image::codecs::gif::GifEncoder as ImageGifEncoder;
use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
use image::codecs::png::PngEncoder as ImagePngEncoder;
use image::{ColorType, ImageEncoder as _, RgbaImage};
use std::io::Cursor;

use super::error::ImageError;
use super::format::FormatTag;
use crate::constants::{DEFAULT_JPEG_QUALITY, GIF_QUANTIZER_SPEED};

/// Quality settings for lossy encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderQuality {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
}

impl Default for EncoderQuality {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl EncoderQuality {
    /// Create quality settings with specified quality level
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

/// Result of encoding an image
#[derive(Debug)]
pub struct EncodedImage {
    /// The encoded image data
    pub data: Vec<u8>,
    /// The container actually written
    pub format: FormatTag,
    /// Content-Type header value
    pub content_type: &'static str,
}

impl EncodedImage {
    pub fn new(data: Vec<u8>, format: FormatTag) -> Self {
        Self {
            data,
            format,
            content_type: format.content_type(),
        }
    }
}

/// Trait for image encoders
///
/// Object-safe so the factory can hand out `Box<dyn ImageEncoder>`.
pub trait ImageEncoder: Send + Sync {
    /// The container this encoder produces
    fn format(&self) -> FormatTag;

    /// Encode an RGBA grid
    fn encode(&self, img: &RgbaImage, quality: EncoderQuality)
        -> Result<EncodedImage, ImageError>;
}

/// Baseline JPEG, alpha dropped
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> FormatTag {
        FormatTag::Jpeg
    }

    fn encode(
        &self,
        img: &RgbaImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        let rgb_data = rgba_to_rgb(img.as_raw());

        let mut output = Cursor::new(Vec::new());
        ImageJpegEncoder::new_with_quality(&mut output, quality.quality)
            .write_image(&rgb_data, img.width(), img.height(), ColorType::Rgb8)
            .map_err(|e| ImageError::encode_failed("jpeg", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), FormatTag::Jpeg))
    }
}

/// Lossless PNG
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> FormatTag {
        FormatTag::Png
    }

    fn encode(
        &self,
        img: &RgbaImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        let mut output = Cursor::new(Vec::new());
        ImagePngEncoder::new(&mut output)
            .write_image(img.as_raw(), img.width(), img.height(), ColorType::Rgba8)
            .map_err(|e| ImageError::encode_failed("png", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), FormatTag::Png))
    }
}

/// Single-frame GIF with a NeuQuant palette
pub struct GifEncoder {
    /// Quantizer speed (1-30, where 1 is slowest/best palette)
    pub speed: i32,
}

impl Default for GifEncoder {
    fn default() -> Self {
        Self {
            speed: GIF_QUANTIZER_SPEED,
        }
    }
}

impl ImageEncoder for GifEncoder {
    fn format(&self) -> FormatTag {
        FormatTag::Gif
    }

    fn encode(
        &self,
        img: &RgbaImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        if img.width() > u16::MAX as u32 || img.height() > u16::MAX as u32 {
            return Err(ImageError::invalid_dimensions(
                img.width(),
                img.height(),
                "GIF frames are limited to 65535 pixels per side",
            ));
        }

        let mut output = Cursor::new(Vec::new());
        {
            // The trailer is written when the encoder drops
            let mut encoder = ImageGifEncoder::new_with_speed(&mut output, self.speed);
            encoder
                .encode(img.as_raw(), img.width(), img.height(), ColorType::Rgba8)
                .map_err(|e| ImageError::encode_failed("gif", e.to_string()))?;
        }

        Ok(EncodedImage::new(output.into_inner(), FormatTag::Gif))
    }
}

/// Uncompressed 24-bit BMP, alpha dropped
pub struct BmpEncoder;

impl ImageEncoder for BmpEncoder {
    fn format(&self) -> FormatTag {
        FormatTag::Bmp
    }

    fn encode(
        &self,
        img: &RgbaImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        let rgb_data = rgba_to_rgb(img.as_raw());

        let mut output = Cursor::new(Vec::new());
        ImageBmpEncoder::new(&mut output)
            .write_image(&rgb_data, img.width(), img.height(), ColorType::Rgb8)
            .map_err(|e| ImageError::encode_failed("bmp", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), FormatTag::Bmp))
    }
}

/// Factory for creating encoders based on the source format tag
pub struct EncoderFactory;

impl EncoderFactory {
    /// Create the encoder for `format`; unknown formats fall back to JPEG
    pub fn create(format: FormatTag) -> Box<dyn ImageEncoder> {
        match format {
            FormatTag::Png => Box::new(PngEncoder),
            FormatTag::Gif => Box::new(GifEncoder::default()),
            FormatTag::Bmp => Box::new(BmpEncoder),
            FormatTag::Jpeg | FormatTag::Other => Box::new(JpegEncoder),
        }
    }
}

/// Encode `img` in the container matching `format`
pub fn encode(
    img: &RgbaImage,
    format: FormatTag,
    quality: EncoderQuality,
) -> Result<EncodedImage, ImageError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(ImageError::encode_failed(
            format.output().as_str(),
            "image has zero area",
        ));
    }

    EncoderFactory::create(format).encode(img, quality)
}

/// Convert RGBA to RGB by discarding alpha channel
fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for chunk in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&chunk[..3]);
    }
    rgb
}
