//! Deterministic raster rendering of drawing documents.

use crate::text::GlyphPainter;
use crate::{RenderError, RenderResult};
use inkscribe_core::geometry::pressure_to_width;
use inkscribe_core::stroke::{ConvertedText, Stroke, StrokeId, ToolKind};
use inkscribe_core::{Document, PageSize};
use kurbo::{BezPath, PathEl, Rect};
use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapMut,
    Transform,
};

/// Stateless full-document raster renderer.
///
/// Every redraw clears the surface and replays the document from scratch:
/// strokes in insertion order, then converted texts on top. There is no
/// dirty-rect tracking; output depends only on the document passed in.
pub struct Renderer {
    glyphs: Option<GlyphPainter>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a renderer with no font configured. Converted texts are
    /// skipped until a face is supplied.
    pub fn new() -> Self {
        Self { glyphs: None }
    }

    /// Create a renderer with a host-provided font face.
    pub fn with_font(font_bytes: &[u8]) -> RenderResult<Self> {
        Ok(Self {
            glyphs: Some(GlyphPainter::from_bytes(font_bytes)?),
        })
    }

    /// Replace the font face used for converted texts.
    pub fn set_font(&mut self, font_bytes: &[u8]) -> RenderResult<()> {
        self.glyphs = Some(GlyphPainter::from_bytes(font_bytes)?);
        Ok(())
    }

    pub fn has_font(&self) -> bool {
        self.glyphs.is_some()
    }

    /// Redraw the whole document onto a fresh page-sized surface.
    pub fn render(&self, document: &Document, page: PageSize) -> RenderResult<Pixmap> {
        self.render_with_preview(document, None, page)
    }

    /// Redraw the document plus a transient preview stroke (shape drags).
    /// The preview is painted after committed strokes but never enters the
    /// document.
    pub fn render_with_preview(
        &self,
        document: &Document,
        preview: Option<&Stroke>,
        page: PageSize,
    ) -> RenderResult<Pixmap> {
        let (width, height) = page.dimensions();
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidSurface(width, height))?;
        {
            let mut surface = pixmap.as_mut();
            surface.fill(Color::WHITE);
            for stroke in &document.strokes {
                draw_stroke(&mut surface, stroke, Transform::identity());
            }
            if let Some(stroke) = preview {
                draw_stroke(&mut surface, stroke, Transform::identity());
            }
        }
        for text in &document.converted_texts {
            self.draw_converted_text(&mut pixmap, text);
        }
        Ok(pixmap)
    }

    /// Rasterize only the given strokes onto a surface sized to `region`,
    /// translated so the region's top-left lands at the origin. Used to crop
    /// recognition input; converted texts are not included.
    pub fn render_region(
        &self,
        document: &Document,
        ids: &[StrokeId],
        region: Rect,
    ) -> RenderResult<Pixmap> {
        let width = (region.width().ceil() as u32).max(1);
        let height = (region.height().ceil() as u32).max(1);
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidSurface(width, height))?;
        let mut surface = pixmap.as_mut();
        surface.fill(Color::WHITE);

        let transform = Transform::from_translate(-region.x0 as f32, -region.y0 as f32);
        for stroke in document.strokes_by_ids(ids) {
            draw_stroke(&mut surface, stroke, transform);
        }
        drop(surface);
        Ok(pixmap)
    }

    /// Render the full document and encode it as PNG, for export/download.
    pub fn export_png(&self, document: &Document, page: PageSize) -> RenderResult<Vec<u8>> {
        let pixmap = self.render(document, page)?;
        encode_png(&pixmap)
    }

    fn draw_converted_text(&self, pixmap: &mut Pixmap, text: &ConvertedText) {
        match &self.glyphs {
            Some(glyphs) => glyphs.draw_text(
                pixmap,
                &text.text,
                text.position.x,
                text.position.y,
                text.font_size as f32,
                text.color,
            ),
            None => log::debug!("no font configured; skipping converted text {}", text.id),
        }
    }
}

/// Encode a pixmap as PNG bytes.
pub fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    pixmap
        .encode_png()
        .map_err(|e| RenderError::Encode(e.to_string()))
}

/// Paint one stroke. Erasers subtract underlying pixels; everything else
/// paints over them.
fn draw_stroke(pixmap: &mut PixmapMut<'_>, stroke: &Stroke, transform: Transform) {
    match stroke.tool.kind {
        ToolKind::Pen => draw_ink(pixmap, stroke, BlendMode::SourceOver, transform),
        ToolKind::Eraser => draw_ink(pixmap, stroke, BlendMode::DestinationOut, transform),
        ToolKind::Rectangle | ToolKind::Circle => {
            let Some(path) = stroke.shape_path().as_ref().and_then(bez_to_path) else {
                return;
            };
            let paint = stroke_paint(stroke, BlendMode::SourceOver);
            let outline = tiny_skia::Stroke {
                width: stroke.tool.size as f32,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..tiny_skia::Stroke::default()
            };
            pixmap.stroke_path(&path, &paint, &outline, transform, None);
        }
        // Text entries are rendered from ConvertedText, never from strokes.
        ToolKind::Text => {}
    }
}

/// Paint a freehand path as midpoint-quadratic segments.
///
/// Each segment's control point is the sampled point itself and its endpoint
/// the midpoint to the next sample; line width is recomputed per segment
/// from that segment's own pressure, so width varies along the stroke.
fn draw_ink(
    pixmap: &mut PixmapMut<'_>,
    stroke: &Stroke,
    blend_mode: BlendMode,
    transform: Transform,
) {
    let points = stroke.render_points();
    let paint = stroke_paint(stroke, blend_mode);

    let [first, rest @ ..] = points else {
        return;
    };

    if rest.is_empty() {
        // A zero-length gesture still leaves a mark: a filled disc sized by
        // its pressure.
        let radius = (pressure_to_width(first.pressure, stroke.tool.size) / 2.0) as f32;
        if let Some(path) = PathBuilder::from_circle(first.x as f32, first.y as f32, radius) {
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
        return;
    }

    let mut cursor = (first.x as f32, first.y as f32);
    for i in 1..points.len().saturating_sub(1) {
        let control = points[i];
        let next = points[i + 1];
        let mid = (
            ((control.x + next.x) / 2.0) as f32,
            ((control.y + next.y) / 2.0) as f32,
        );

        let mut builder = PathBuilder::new();
        builder.move_to(cursor.0, cursor.1);
        builder.quad_to(control.x as f32, control.y as f32, mid.0, mid.1);
        if let Some(path) = builder.finish() {
            stroke_segment(pixmap, &path, &paint, control.pressure, stroke.tool.size, transform);
        }
        cursor = mid;
    }

    // Close out at the final sample.
    let last = points[points.len() - 1];
    let mut builder = PathBuilder::new();
    builder.move_to(cursor.0, cursor.1);
    builder.line_to(last.x as f32, last.y as f32);
    if let Some(path) = builder.finish() {
        stroke_segment(pixmap, &path, &paint, last.pressure, stroke.tool.size, transform);
    }
}

fn stroke_segment(
    pixmap: &mut PixmapMut<'_>,
    path: &tiny_skia::Path,
    paint: &Paint<'_>,
    pressure: f64,
    base_size: f64,
    transform: Transform,
) {
    let segment = tiny_skia::Stroke {
        width: pressure_to_width(pressure, base_size) as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..tiny_skia::Stroke::default()
    };
    pixmap.stroke_path(path, paint, &segment, transform, None);
}

fn stroke_paint(stroke: &Stroke, blend_mode: BlendMode) -> Paint<'static> {
    let color = stroke.tool.color;
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(color.r, color.g, color.b, 255));
    paint.blend_mode = blend_mode;
    paint.anti_alias = true;
    paint
}

/// Convert a kurbo path into a tiny-skia path.
fn bez_to_path(bez: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in bez.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}
