// Geometry tests for resizing and watermark placement

use image::{Rgba, RgbaImage};
use rstest::rstest;

use upmark::imaging::{resize, scaled_height};
use upmark::watermark::{composite, needs_shrink, place, ImageDimensions, Placement, WatermarkOptions};

const GRAY: Rgba<u8> = Rgba([90, 90, 90, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

// Test: output height stays within one source width of the exact ratio
#[rstest]
fn test_resize_preserves_aspect_ratio(
    #[values((640, 480), (333, 97), (20, 40), (500, 1), (1920, 1081))] source: (u32, u32),
    #[values(1, 37, 200, 800)] target: u32,
) {
    let (w0, h0) = source;
    let out = resize(solid(w0, h0, GRAY), target).unwrap();
    let (w, h) = out.dimensions();

    assert_eq!(w, target);
    assert!(h >= 1);
    let error = (h as i64 * w0 as i64 - target as i64 * h0 as i64).abs();
    assert!(error <= w0 as i64, "{}x{} -> {}x{}", w0, h0, w, h);
    assert_eq!(h, scaled_height(w0, h0, target));
}

#[test]
fn test_identity_resize_keeps_pixels() {
    let mut img = RgbaImage::new(40, 30);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgba([x as u8, y as u8, (x + y) as u8, 200]);
    }
    let out = resize(img.clone(), 40).unwrap();
    assert_eq!(out, img);
}

// Test: only pixels under the placed mark change
#[rstest]
#[case(400, 300)]
#[case(100, 60)]
#[case(30, 20)]
fn test_composite_changes_only_mark_region(#[case] width: u32, #[case] height: u32) {
    let options = WatermarkOptions::default();
    let mark = solid(24, 12, BLUE);
    let base = solid(width, height, GRAY);

    let painted = if needs_shrink(width, 24, &options) {
        ImageDimensions::new(255, scaled_height(24, 12, 255))
    } else {
        ImageDimensions::new(24, 12)
    };
    let placement = place(ImageDimensions::new(width, height), painted, &options);
    let out = composite(base, &mark, &options).unwrap();
    assert_eq!(out.dimensions(), (width, height));

    let (left, top) = (placement.x as u32, placement.y as u32);
    for (x, y, pixel) in out.enumerate_pixels() {
        let inside = x >= left && y >= top && x < left + placement.width && y < top + placement.height;
        if !inside {
            assert_eq!(*pixel, GRAY, "pixel {},{} changed", x, y);
        }
    }
}

// Test: a mark narrower than 255 px but wider than base / 8 is resized to 255 px
#[test]
fn test_narrow_mark_on_small_base_grows_to_shrink_width() {
    let options = WatermarkOptions {
        opacity: 1.0,
        margin: 0,
        ..WatermarkOptions::default()
    };
    let out = composite(solid(400, 400, GRAY), &solid(100, 10, BLUE), &options).unwrap();

    let painted = (0..400).filter(|&x| *out.get_pixel(x, 399) != GRAY).count();
    assert_eq!(painted, 255);
}

// Test: a mark wider than base / 8 ends up at most 255 px wide
#[test]
fn test_wide_mark_is_shrunk() {
    let options = WatermarkOptions {
        opacity: 1.0,
        ..WatermarkOptions::default()
    };
    let out = composite(solid(3000, 600, GRAY), &solid(600, 60, BLUE), &options).unwrap();

    // Shrunk to 255 x 26 and placed 20 px from the corner
    let left = 3000 - 20 - 255;
    let top = 600 - 20 - 26;
    let inside = out.get_pixel(left + 100, top + 13);
    assert!(inside[0] <= 2 && inside[2] >= 253, "inside was {:?}", inside);
    assert_eq!(*out.get_pixel(left - 5, top + 13), GRAY);
    assert_eq!(*out.get_pixel(left + 100, top - 5), GRAY);
}

// Test: a mark larger than the image is pinned to the top-left corner
#[test]
fn test_oversized_mark_is_clamped_to_origin() {
    let options = WatermarkOptions {
        opacity: 1.0,
        ..WatermarkOptions::default()
    };
    let placement = place(
        ImageDimensions::new(10, 10),
        ImageDimensions::new(50, 40),
        &options,
    );
    assert_eq!(placement, Placement::new(0, 0, 50, 40));

    let out = composite(solid(10, 10, GRAY), &solid(50, 40, BLUE), &options).unwrap();
    assert_eq!(out.dimensions(), (10, 10));
    assert!(out.pixels().all(|p| p[0] <= 5 && p[2] >= 250));
}

#[test]
fn test_zero_opacity_leaves_base_untouched() {
    let options = WatermarkOptions {
        opacity: 0.0,
        ..WatermarkOptions::default()
    };
    let base = solid(200, 100, GRAY);
    let out = composite(base.clone(), &solid(30, 30, BLUE), &options).unwrap();
    assert_eq!(out, base);
}
