//! Shared fixtures for unit tests

use image::{Rgba, RgbaImage};
use std::io::Cursor;

/// Encode a small synthetic RGBA image as PNG bytes
///
/// The left half is opaque blue, the right half opaque orange, so mask-like
/// transforms have visible structure to act on.
pub(crate) fn encode_png(width: u32, height: u32) -> Vec<u8> {
    let mut img = RgbaImage::new(width, height);
    for (x, _y, pixel) in img.enumerate_pixels_mut() {
        *pixel = if x < width / 2 {
            Rgba([20, 60, 220, 255])
        } else {
            Rgba([230, 140, 30, 255])
        };
    }
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

/// Encode a small synthetic RGB image as JPEG bytes
pub(crate) fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut img = image::RgbImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let intensity = ((x + y) % 100) as u8;
        *pixel = image::Rgb([intensity, 128, 255 - intensity]);
    }
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Jpeg)
        .unwrap();
    buffer
}
