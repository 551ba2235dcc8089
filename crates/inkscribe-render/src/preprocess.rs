//! Image preprocessing for the recognition collaborator.
//!
//! Full-canvas recognition input is downscaled and contrast-enhanced before
//! it leaves the engine; region crops are sent as-is.

use crate::{RenderError, RenderResult};
use image::{GrayImage, RgbaImage};
use tiny_skia::Pixmap;

/// Longest side of a full-canvas recognition image, in pixels.
pub const MAX_RECOGNITION_DIMENSION: u32 = 800;

/// Luminance cutoff for the binary threshold.
pub const BINARY_THRESHOLD: u16 = 128;

/// Convert a premultiplied pixmap to a straight-alpha image composited over
/// a white page.
pub fn to_rgba_over_white(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let height = pixmap.height();
    let data = pixmap.data();
    let mut out = RgbaImage::new(width, height);

    for (i, pixel) in out.pixels_mut().enumerate() {
        let idx = i * 4;
        let a = data[idx + 3] as u16;
        // Premultiplied source over white: c + 255 * (1 - a).
        pixel.0 = [
            (data[idx] as u16 + (255 - a)) as u8,
            (data[idx + 1] as u16 + (255 - a)) as u8,
            (data[idx + 2] as u16 + (255 - a)) as u8,
            255,
        ];
    }
    out
}

/// Downscale so the longer side fits [`MAX_RECOGNITION_DIMENSION`].
///
/// Returns the (possibly untouched) image and the applied scale factor, used
/// to map word boxes back to canvas coordinates.
pub fn downscale(image: RgbaImage) -> (RgbaImage, f64) {
    let longest = image.width().max(image.height());
    if longest <= MAX_RECOGNITION_DIMENSION {
        return (image, 1.0);
    }

    let scale = MAX_RECOGNITION_DIMENSION as f64 / longest as f64;
    let width = ((image.width() as f64 * scale).round() as u32).max(1);
    let height = ((image.height() as f64 * scale).round() as u32).max(1);
    let resized = image::imageops::resize(&image, width, height, image::imageops::FilterType::Triangle);
    (resized, scale)
}

/// Binary threshold: average luminance below the cutoff goes black,
/// everything else white.
pub fn binarize(image: &RgbaImage) -> GrayImage {
    let mut out = GrayImage::new(image.width(), image.height());
    for (src, dst) in image.pixels().zip(out.pixels_mut()) {
        let [r, g, b, _] = src.0;
        let luminance = (r as u16 + g as u16 + b as u16) / 3;
        dst.0 = [if luminance < BINARY_THRESHOLD { 0 } else { 255 }];
    }
    out
}

/// Encode a grayscale image as PNG bytes.
pub fn encode_gray_png(image: &GrayImage) -> RenderResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Full preprocessing chain for on-demand recognition: composite, downscale,
/// threshold, encode. Returns the PNG bytes and the downscale factor.
pub fn recognition_input(pixmap: &Pixmap) -> RenderResult<(Vec<u8>, f64)> {
    let rgba = to_rgba_over_white(pixmap);
    let (scaled, scale) = downscale(rgba);
    let binary = binarize(&scaled);
    Ok((encode_gray_png(&binary)?, scale))
}
