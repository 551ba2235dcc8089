//! Point normalization and stroke smoothing.
//!
//! Pure functions that turn raw pointer samples into canvas-space points and
//! post-process committed freehand paths.

use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Default pressure for input devices that do not report any (mouse).
pub const DEFAULT_MOUSE_PRESSURE: f64 = 0.5;

/// Default pressure for touch input.
pub const DEFAULT_TOUCH_PRESSURE: f64 = 0.7;

/// A single sampled point of a stroke, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    /// Normalized pen pressure in [0, 1].
    pub pressure: f64,
}

impl SamplePoint {
    /// Create a point with an explicit pressure.
    pub fn new(x: f64, y: f64, pressure: f64) -> Self {
        Self { x, y, pressure }
    }

    /// Create a point with the default (no-pressure-device) pressure.
    pub fn plain(x: f64, y: f64) -> Self {
        Self::new(x, y, DEFAULT_MOUSE_PRESSURE)
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &SamplePoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// The kind of pointing device a sample came from.
///
/// Determines how pressure is normalized: styluses report their own value,
/// everything else gets a fixed default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerDevice {
    Mouse,
    Touch,
    Stylus { pressure: f64 },
}

impl PointerDevice {
    /// Normalized pressure for this device.
    pub fn pressure(&self) -> f64 {
        match self {
            PointerDevice::Mouse => DEFAULT_MOUSE_PRESSURE,
            PointerDevice::Touch => DEFAULT_TOUCH_PRESSURE,
            PointerDevice::Stylus { pressure } => pressure.clamp(0.0, 1.0),
        }
    }
}

/// Mapping from client (window) coordinates to canvas coordinates.
///
/// The host surface may be displayed at a different size than the raster
/// backing store; samples are offset and scaled before entering the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    /// Left edge of the surface in client coordinates.
    pub offset_x: f64,
    /// Top edge of the surface in client coordinates.
    pub offset_y: f64,
    /// Canvas pixels per client pixel, horizontally.
    pub scale_x: f64,
    /// Canvas pixels per client pixel, vertically.
    pub scale_y: f64,
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl SurfaceGeometry {
    /// Normalize a raw client-space sample into a canvas-space point.
    pub fn normalize(&self, client_x: f64, client_y: f64, device: PointerDevice) -> SamplePoint {
        SamplePoint::new(
            (client_x - self.offset_x) * self.scale_x,
            (client_y - self.offset_y) * self.scale_y,
            device.pressure(),
        )
    }
}

/// Smooth a point sequence with a single-pass 3-tap low-pass filter.
///
/// Endpoints are preserved verbatim; every interior point is replaced by
/// `0.25 * prev + 0.5 * cur + 0.25 * next` applied independently to x, y and
/// pressure. Sequences shorter than 3 points are returned unchanged.
pub fn smooth(points: &[SamplePoint]) -> Vec<SamplePoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);
    for w in points.windows(3) {
        out.push(SamplePoint::new(
            0.25 * w[0].x + 0.5 * w[1].x + 0.25 * w[2].x,
            0.25 * w[0].y + 0.5 * w[1].y + 0.25 * w[2].y,
            0.25 * w[0].pressure + 0.5 * w[1].pressure + 0.25 * w[2].pressure,
        ));
    }
    out.push(points[points.len() - 1]);
    out
}

/// Map pen pressure to a line width for a given base size.
///
/// Amplifies mid-range pressure while capping extremes, so no-pressure input
/// at 0.5 yields `base_size * 0.75` rather than a degenerate hairline.
pub fn pressure_to_width(pressure: f64, base_size: f64) -> f64 {
    base_size * (pressure * 1.5).clamp(0.3, 2.0)
}

/// Axis-aligned bounding box of a point set. `None` when empty.
pub fn bounding_box<'a>(points: impl IntoIterator<Item = &'a SamplePoint>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let mut rect = Rect::new(first.x, first.y, first.x, first.y);
    for p in iter {
        rect.x0 = rect.x0.min(p.x);
        rect.y0 = rect.y0.min(p.y);
        rect.x1 = rect.x1.max(p.x);
        rect.y1 = rect.y1.max(p.y);
    }
    Some(rect)
}
