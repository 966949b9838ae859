//! Watermark compositor for blending the mark onto the resized upload.
//!
//! The base image is taken by value and returned with the mark blended in at
//! the bottom-right corner. Only pixels inside the placed rectangle change.
//!
//! # Example
//!
//! ```ignore
//! use upmark::watermark::{composite, WatermarkOptions};
//!
//! let stamped = composite(resized, &logo, &WatermarkOptions::default())?;
//! ```

use image::{Rgba, RgbaImage};

use super::position::{ImageDimensions, Placement};
use super::WatermarkOptions;
use crate::imaging::{resize, ImageError};

/// Blend `mark` onto `base` at the bottom-right corner.
///
/// A mark wider than `base.width / shrink_divisor` is first resized to
/// `shrink_width`, which may enlarge a narrow mark on a small base. The output
/// has exactly the base's dimensions.
pub fn composite(
    mut base: RgbaImage,
    mark: &RgbaImage,
    options: &WatermarkOptions,
) -> Result<RgbaImage, ImageError> {
    if ImageDimensions::of(&base).is_empty() {
        return Err(ImageError::composite_failed("base image has zero area"));
    }
    if ImageDimensions::of(mark).is_empty() {
        return Err(ImageError::composite_failed("watermark has zero area"));
    }

    let shrunk;
    let mark = if needs_shrink(base.width(), mark.width(), options) {
        shrunk = resize(mark.clone(), options.shrink_width)
            .map_err(|e| ImageError::composite_failed(format!("shrinking watermark: {}", e)))?;
        &shrunk
    } else {
        mark
    };

    let placement = place(ImageDimensions::of(&base), ImageDimensions::of(mark), options);
    blend_at(&mut base, mark, placement, options.opacity);

    Ok(base)
}

/// Where a mark of the given size lands on an image of the given size
pub fn place(
    image: ImageDimensions,
    mark: ImageDimensions,
    options: &WatermarkOptions,
) -> Placement {
    Placement::bottom_right(image, mark, options.margin).clamp_to_origin()
}

/// True when the mark is wider than `base_width / shrink_divisor`
pub fn needs_shrink(base_width: u32, mark_width: u32, options: &WatermarkOptions) -> bool {
    mark_width > base_width / options.shrink_divisor.max(1)
}

/// Blend every visible mark pixel onto `target` with the extra `opacity`.
fn blend_at(target: &mut RgbaImage, mark: &RgbaImage, placement: Placement, opacity: f32) {
    let visible = match placement.clip_to(ImageDimensions::of(target)) {
        Some(visible) => visible,
        None => return,
    };

    for ty in visible.y as u32..visible.y as u32 + visible.height {
        for tx in visible.x as u32..visible.x as u32 + visible.width {
            let wx = (tx as i64 - placement.x as i64) as u32;
            let wy = (ty as i64 - placement.y as i64) as u32;

            let fg = *mark.get_pixel(wx, wy);
            let bg = *target.get_pixel(tx, ty);
            target.put_pixel(tx, ty, blend_pixels(bg, fg, opacity));
        }
    }
}

/// Porter-Duff "over" with the foreground alpha scaled by `opacity`.
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    if fg_alpha <= 0.0 {
        return background;
    }
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
