//! Stroke model: tool snapshots, committed strokes, converted text.

use crate::geometry::{self, SamplePoint};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for strokes and converted-text entries.
pub type StrokeId = Uuid;

/// Color parsing errors.
#[derive(Debug, Error)]
pub enum ColorError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
}

/// An RGB color, serialized as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// Parse a `#rrggbb` (or `#rgb`) hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        match digits.len() {
            3 => {
                let mut c = [0u8; 3];
                for (i, slot) in c.iter_mut().enumerate() {
                    *slot = u8::from_str_radix(&digits[i..i + 1], 16)
                        .map_err(|_| ColorError::InvalidHex(hex.to_string()))?
                        * 17;
                }
                Ok(Self::new(c[0], c[1], c[2]))
            }
            6 => {
                let mut c = [0u8; 3];
                for (i, slot) in c.iter_mut().enumerate() {
                    *slot = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
                        .map_err(|_| ColorError::InvalidHex(hex.to_string()))?;
                }
                Ok(Self::new(c[0], c[1], c[2]))
            }
            _ => Err(ColorError::InvalidHex(hex.to_string())),
        }
    }

    /// Format as a `#rrggbb` hex string.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

/// The closed set of drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    Rectangle,
    Circle,
    Text,
}

impl ToolKind {
    /// Freehand tools sample the full pointer path; shape tools commit only
    /// the drag start and end.
    pub fn is_freehand(&self) -> bool {
        matches!(self, ToolKind::Pen | ToolKind::Eraser)
    }

    pub fn is_shape(&self) -> bool {
        matches!(self, ToolKind::Rectangle | ToolKind::Circle)
    }
}

/// An immutable tool snapshot.
///
/// Copied into each stroke at creation time, so later tool changes never
/// retroactively alter committed strokes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub kind: ToolKind,
    pub color: Rgb,
    /// Base stroke width in canvas pixels. Must be positive.
    pub size: f64,
}

impl Tool {
    pub fn new(kind: ToolKind, color: Rgb, size: f64) -> Self {
        Self {
            kind,
            color,
            size: size.max(0.1),
        }
    }
}

impl Default for Tool {
    fn default() -> Self {
        Self {
            kind: ToolKind::Pen,
            color: Rgb::black(),
            size: 2.0,
        }
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One committed ink or shape action.
///
/// Freehand strokes hold the full sampled path (at least one point); shape
/// strokes hold exactly the drag start and end. `smoothed_points`, when
/// present, has the same length as `points` and only augments rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: StrokeId,
    pub tool: Tool,
    pub points: Vec<SamplePoint>,
    pub timestamp_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothed_points: Option<Vec<SamplePoint>>,
}

impl Stroke {
    /// Begin a new stroke at a single point.
    pub fn new(tool: Tool, first: SamplePoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool,
            points: vec![first],
            timestamp_ms: now_ms(),
            smoothed_points: None,
        }
    }

    /// Build a two-point shape stroke from a drag.
    pub fn from_drag(tool: Tool, anchor: SamplePoint, release: SamplePoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool,
            points: vec![anchor, release],
            timestamp_ms: now_ms(),
            smoothed_points: None,
        }
    }

    /// Append a sampled point to an in-progress stroke.
    pub fn add_point(&mut self, point: SamplePoint) {
        self.points.push(point);
    }

    /// Compute and attach the smoothed path. Idempotent once frozen.
    pub fn freeze_smoothed(&mut self) {
        if self.smoothed_points.is_none() {
            self.smoothed_points = Some(geometry::smooth(&self.points));
        }
    }

    /// The point sequence to render: smoothed when available, raw otherwise.
    pub fn render_points(&self) -> &[SamplePoint] {
        self.smoothed_points.as_deref().unwrap_or(&self.points)
    }

    /// Bounding box of the raw sampled points.
    pub fn bounds(&self) -> Rect {
        geometry::bounding_box(&self.points).unwrap_or(Rect::ZERO)
    }

    /// Outline path for the two-point shape tools.
    ///
    /// Rectangle spans the min corner and absolute deltas regardless of drag
    /// direction; Circle is an ellipse centered at the midpoint of the two
    /// points with radii of half the deltas. `None` for freehand tools, whose
    /// paths are built per-segment by the renderer.
    pub fn shape_path(&self) -> Option<BezPath> {
        let (a, b) = match self.points.as_slice() {
            [a, b, ..] => (a, b),
            [a] => (a, a),
            [] => return None,
        };
        match self.tool.kind {
            ToolKind::Rectangle => {
                let rect = Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y));
                Some(rect.to_path(0.1))
            }
            ToolKind::Circle => {
                let center = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
                let radii = ((b.x - a.x).abs() / 2.0, (b.y - a.y).abs() / 2.0);
                Some(kurbo::Ellipse::new(center, radii, 0.0).to_path(0.1))
            }
            ToolKind::Pen | ToolKind::Eraser | ToolKind::Text => None,
        }
    }
}

/// A permanent textual annotation produced by handwriting recognition,
/// anchored at the bounding box of the strokes it replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedText {
    pub id: StrokeId,
    pub original_stroke_ids: Vec<StrokeId>,
    pub text: String,
    pub position: Point,
    pub font_size: f64,
    pub color: Rgb,
}

impl ConvertedText {
    pub fn new(
        original_stroke_ids: Vec<StrokeId>,
        text: String,
        position: Point,
        font_size: f64,
        color: Rgb,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_stroke_ids,
            text,
            position,
            font_size,
            color,
        }
    }
}

/// A transient word-level result from on-demand full-canvas recognition.
///
/// Presented as an advisory overlay only; never persisted and never promoted
/// to [`ConvertedText`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub text: String,
    /// Normalized confidence in [0, 1].
    pub confidence: f64,
    /// Word bounding box in canvas coordinates.
    pub bounding_box: Rect,
}
