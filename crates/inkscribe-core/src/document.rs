//! The canvas document: committed strokes and converted-text entries.

use crate::geometry;
use crate::stroke::{ConvertedText, Stroke, StrokeId};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// A drawing document: the unit of undo/redo and of persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Committed strokes, in insertion (render) order.
    pub strokes: Vec<Stroke>,
    /// Recognition output, in insertion order. Drawn on top of all strokes.
    pub converted_texts: Vec<ConvertedText>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a committed stroke.
    pub fn add_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Append a converted-text entry.
    pub fn add_converted_text(&mut self, text: ConvertedText) {
        self.converted_texts.push(text);
    }

    /// Look up a stroke by id.
    pub fn stroke(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id == id)
    }

    /// Mutable lookup of a stroke by id.
    pub fn stroke_mut(&mut self, id: StrokeId) -> Option<&mut Stroke> {
        self.strokes.iter_mut().find(|s| s.id == id)
    }

    /// Strokes matching a set of ids, in document order.
    pub fn strokes_by_ids<'a>(&'a self, ids: &'a [StrokeId]) -> impl Iterator<Item = &'a Stroke> {
        self.strokes.iter().filter(move |s| ids.contains(&s.id))
    }

    /// Union bounding box over the sampled points of the given strokes.
    /// `None` when no matching stroke has any points.
    pub fn bounds_of(&self, ids: &[StrokeId]) -> Option<Rect> {
        geometry::bounding_box(self.strokes_by_ids(ids).flat_map(|s| s.points.iter()))
    }

    /// Bounding box of every stroke in the document.
    pub fn bounds(&self) -> Option<Rect> {
        geometry::bounding_box(self.strokes.iter().flat_map(|s| s.points.iter()))
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.converted_texts.is_empty()
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
