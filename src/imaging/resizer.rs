//! Aspect-preserving resize
//!
//! Uses fast-image-resize with a Lanczos3 convolution. Alpha is premultiplied
//! for the convolution so transparent watermark edges do not bleed color.

use fast_image_resize::{FilterType, Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::RgbaImage;
use std::num::NonZeroU32;

use super::error::ImageError;
use crate::constants::DEFAULT_MAX_SOURCE_PIXELS;

/// Height that keeps the source aspect ratio at `target_width`
///
/// Rounds to the nearest pixel and never returns 0.
pub fn scaled_height(src_width: u32, src_height: u32, target_width: u32) -> u32 {
    let height = (target_width as u64 * src_height as u64 + src_width as u64 / 2) / src_width as u64;
    height.clamp(1, u32::MAX as u64) as u32
}

/// Resize `img` to `target_width`, deriving the height from the aspect ratio
///
/// Returns the input unchanged when it already has the requested width. The
/// output is held to the default pixel ceiling; see [`resize_within`].
pub fn resize(img: RgbaImage, target_width: u32) -> Result<RgbaImage, ImageError> {
    resize_within(img, target_width, DEFAULT_MAX_SOURCE_PIXELS)
}

/// Resize `img` to `target_width`, failing with `InvalidDimensions` when the
/// output would exceed `max_pixels`
///
/// A tall narrow source can be tiny on disk and still scale into billions of
/// pixels, so the ceiling is applied to the computed output before allocating.
pub fn resize_within(
    img: RgbaImage,
    target_width: u32,
    max_pixels: u64,
) -> Result<RgbaImage, ImageError> {
    let (src_w, src_h) = img.dimensions();

    if target_width == 0 {
        return Err(ImageError::invalid_dimensions(
            target_width,
            0,
            "target width must be positive",
        ));
    }
    if src_w == 0 || src_h == 0 {
        return Err(ImageError::invalid_dimensions(
            src_w,
            src_h,
            "source image has zero area",
        ));
    }

    if target_width == src_w {
        return Ok(img);
    }

    let target_height = scaled_height(src_w, src_h, target_width);
    check_output_size(target_width, target_height, max_pixels)?;
    resize_exact(img, target_width, target_height)
}

fn check_output_size(width: u32, height: u32, max_pixels: u64) -> Result<(), ImageError> {
    let pixels = width as u64 * height as u64;
    if pixels > max_pixels {
        return Err(ImageError::invalid_dimensions(
            width,
            height,
            format!("output of {} pixels exceeds limit of {}", pixels, max_pixels),
        ));
    }
    Ok(())
}

/// Resize to exact dimensions with Lanczos3
pub fn resize_exact(img: RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage, ImageError> {
    let (src_w, src_h) = img.dimensions();

    let src_width =
        NonZeroU32::new(src_w).ok_or_else(|| ImageError::resize_failed("Source width is 0"))?;
    let src_height =
        NonZeroU32::new(src_h).ok_or_else(|| ImageError::resize_failed("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| ImageError::resize_failed("Target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| ImageError::resize_failed("Target height is 0"))?;
    // fast_image_resize counts pixels in a u32
    check_output_size(target_w, target_h, u32::MAX as u64)?;

    let mut src_image = Image::from_vec_u8(src_width, src_height, img.into_raw(), PixelType::U8x4)
        .map_err(|e| ImageError::resize_failed(format!("Failed to create source image: {:?}", e)))?;

    let alpha_mul_div = MulDiv::default();
    alpha_mul_div
        .multiply_alpha_inplace(&mut src_image.view_mut())
        .map_err(|e| ImageError::resize_failed(format!("Failed to premultiply alpha: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);
    let mut dst_view = dst_image.view_mut();

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_view)
        .map_err(|e| ImageError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    alpha_mul_div
        .divide_alpha_inplace(&mut dst_view)
        .map_err(|e| ImageError::resize_failed(format!("Failed to restore alpha: {:?}", e)))?;

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| ImageError::resize_failed("Failed to create output image buffer"))
}
