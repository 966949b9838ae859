//! Image decoding
//!
//! The container is sniffed from the bytes themselves; file names are never
//! consulted. Dimensions are read from the header and checked against the
//! pixel ceiling before any pixel data is decoded.

use image::io::Reader as ImageReader;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

use super::error::ImageError;
use super::format::FormatTag;

/// Decode an upload into an RGBA grid and the detected format tag
pub fn decode(data: &[u8], max_pixels: u64) -> Result<(RgbaImage, FormatTag), ImageError> {
    let format = image::guess_format(data)
        .map_err(|_| ImageError::decode_failed("unrecognized image format"))?;

    let (width, height) = read_dimensions(data, format)?;
    validate_dimensions(width, height, max_pixels)?;

    let decoded = decode_as(data, format)?;
    Ok((decoded, FormatTag::from_image_format(format)))
}

/// Decode bytes with the PNG decoder, used for the watermark image
pub fn decode_png(data: &[u8]) -> Result<RgbaImage, ImageError> {
    decode_as(data, ImageFormat::Png)
}

fn read_dimensions(data: &[u8], format: ImageFormat) -> Result<(u32, u32), ImageError> {
    let mut reader = ImageReader::new(Cursor::new(data));
    reader.set_format(format);
    reader.into_dimensions().map_err(from_image_error)
}

fn from_image_error(err: image::ImageError) -> ImageError {
    match err {
        image::ImageError::Unsupported(u) => ImageError::unsupported_format(u.to_string()),
        other => ImageError::decode_failed(other.to_string()),
    }
}

fn decode_as(data: &[u8], format: ImageFormat) -> Result<RgbaImage, ImageError> {
    let mut reader = ImageReader::new(Cursor::new(data));
    reader.set_format(format);
    let rgba = reader
        .decode()
        .map_err(from_image_error)?
        .into_rgba8();

    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(ImageError::decode_failed("image has zero area"));
    }

    Ok(rgba)
}

/// Reject zero-area images and images whose pixel count exceeds `max_pixels`
pub fn validate_dimensions(width: u32, height: u32, max_pixels: u64) -> Result<(), ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::decode_failed("image has zero area"));
    }

    let pixels = width as u64 * height as u64;
    if pixels > max_pixels {
        return Err(ImageError::image_bomb(width, height, max_pixels));
    }

    Ok(())
}
