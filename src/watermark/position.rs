//! Placement geometry for the corner watermark.
//!
//! The mark is anchored to the bottom-right corner, `margin` pixels in from
//! both edges. When the base is smaller than mark plus margin the raw offset
//! goes negative; [`Placement::clamp_to_origin`] pulls it back onto the canvas
//! and [`Placement::clip_to`] cuts off whatever still overhangs.
//!
//! # Example
//!
//! ```
//! use upmark::watermark::position::{ImageDimensions, Placement};
//!
//! let image = ImageDimensions::new(800, 600);
//! let mark = ImageDimensions::new(100, 50);
//!
//! let placement = Placement::bottom_right(image, mark, 20);
//! assert_eq!((placement.x, placement.y), (680, 530)); // 800 - 100 - 20, 600 - 50 - 20
//! ```

/// Width and height of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(img: &image::RgbaImage) -> Self {
        Self::new(img.width(), img.height())
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Integer rectangle where the watermark is painted.
///
/// `x` and `y` may be negative before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom-right anchored placement, `margin` pixels from the right and
    /// bottom edges. Not clamped.
    pub fn bottom_right(image: ImageDimensions, mark: ImageDimensions, margin: u32) -> Self {
        let x = image.width as i64 - mark.width as i64 - margin as i64;
        let y = image.height as i64 - mark.height as i64 - margin as i64;
        Self::new(saturate_i32(x), saturate_i32(y), mark.width, mark.height)
    }

    /// Move a negative offset back to 0 on each axis
    pub fn clamp_to_origin(self) -> Self {
        Self {
            x: self.x.max(0),
            y: self.y.max(0),
            ..self
        }
    }

    /// The part of this rectangle that lies inside `image`, if any
    pub fn clip_to(&self, image: ImageDimensions) -> Option<Placement> {
        let x_start = (self.x as i64).max(0);
        let y_start = (self.y as i64).max(0);
        let x_end = (self.x as i64 + self.width as i64).min(image.width as i64);
        let y_end = (self.y as i64 + self.height as i64).min(image.height as i64);

        if x_start >= x_end || y_start >= y_end {
            return None;
        }

        Some(Placement::new(
            x_start as i32,
            y_start as i32,
            (x_end - x_start) as u32,
            (y_end - y_start) as u32,
        ))
    }
}

fn saturate_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
