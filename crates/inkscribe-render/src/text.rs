//! Glyph rasterization for converted-text overlays.

use crate::{RenderError, RenderResult};
use inkscribe_core::Rgb;
use tiny_skia::Pixmap;

/// Paints text into a pixmap using a host-provided font face.
///
/// Simple left-to-right layout: each glyph is rasterized at the requested
/// pixel size and alpha-blended at its metrics offsets; no shaping or
/// kerning beyond the font's advance widths.
pub struct GlyphPainter {
    font: fontdue::Font,
}

impl GlyphPainter {
    /// Load a font face from raw TTF/OTF bytes.
    pub fn from_bytes(bytes: &[u8]) -> RenderResult<Self> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    /// Horizontal advance of a string at the given pixel size.
    pub fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars()
            .map(|ch| self.font.metrics(ch, px).advance_width)
            .sum()
    }

    /// Draw a single line of text with its baseline at `(x, baseline_y)`.
    pub fn draw_text(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        x: f64,
        baseline_y: f64,
        px: f32,
        color: Rgb,
    ) {
        let mut pen_x = x as f32;
        for ch in text.chars() {
            let (metrics, coverage) = self.font.rasterize(ch, px);
            let glyph_x = pen_x + metrics.xmin as f32;
            let glyph_y = baseline_y as f32 - metrics.ymin as f32 - metrics.height as f32;
            blend_coverage(
                pixmap,
                &coverage,
                metrics.width,
                metrics.height,
                glyph_x,
                glyph_y,
                color,
            );
            pen_x += metrics.advance_width;
        }
    }
}

/// Source-over blend of an 8-bit coverage mask into a premultiplied pixmap.
fn blend_coverage(
    pixmap: &mut Pixmap,
    coverage: &[u8],
    width: usize,
    height: usize,
    x: f32,
    y: f32,
    color: Rgb,
) {
    let pm_width = pixmap.width() as i64;
    let pm_height = pixmap.height() as i64;
    let origin_x = x.round() as i64;
    let origin_y = y.round() as i64;
    let data = pixmap.data_mut();

    for row in 0..height as i64 {
        let py = origin_y + row;
        if py < 0 || py >= pm_height {
            continue;
        }
        for col in 0..width as i64 {
            let px = origin_x + col;
            if px < 0 || px >= pm_width {
                continue;
            }
            let alpha = coverage[(row as usize) * width + col as usize] as u32;
            if alpha == 0 {
                continue;
            }
            let idx = ((py * pm_width + px) * 4) as usize;
            let inv = 255 - alpha;
            // Premultiplied source-over.
            data[idx] = ((color.r as u32 * alpha + data[idx] as u32 * inv) / 255) as u8;
            data[idx + 1] = ((color.g as u32 * alpha + data[idx + 1] as u32 * inv) / 255) as u8;
            data[idx + 2] = ((color.b as u32 * alpha + data[idx + 2] as u32 * inv) / 255) as u8;
            data[idx + 3] = (alpha + data[idx + 3] as u32 * inv / 255) as u8;
        }
    }
}
