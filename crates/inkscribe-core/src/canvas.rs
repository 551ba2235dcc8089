//! Canvas runtime state and the pointer input state machine.

use crate::config::CanvasConfig;
use crate::document::Document;
use crate::geometry::{SamplePoint, SurfaceGeometry};
use crate::history::{History, HistoryScope};
use crate::input::{GestureState, PointerEvent};
use crate::pending::PendingBatch;
use crate::storage::{Storage, StorageResult};
use crate::stroke::{RecognitionResult, Stroke, Tool, ToolKind};
use std::time::Instant;

/// Runtime state of one open canvas.
///
/// Owns the document, its history, the active tool and gesture, the pending
/// auto-conversion queue, and any advisory recognition overlays. Pointer
/// handling, history mutation, and state updates are synchronous; nothing
/// here is shared across documents.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// The document being edited.
    pub document: Document,
    /// Undo/redo history over document snapshots.
    pub history: History,
    /// The active tool; copied into each stroke at creation.
    pub tool: Tool,
    /// Host-settable toggles.
    pub config: CanvasConfig,
    /// Client-to-canvas coordinate mapping.
    pub surface: SurfaceGeometry,
    /// Strokes awaiting auto-conversion.
    pub pending: PendingBatch,
    /// Advisory overlays from on-demand full-canvas recognition.
    pub overlays: Vec<RecognitionResult>,
    gesture: GestureState,
    preview: Option<Stroke>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a canvas with an empty document and default configuration.
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// Create a canvas around an existing (loaded) document.
    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            history: History::new(),
            tool: Tool::default(),
            config: CanvasConfig::default(),
            surface: SurfaceGeometry::default(),
            pending: PendingBatch::new(),
            overlays: Vec::new(),
            gesture: GestureState::Idle,
            preview: None,
        }
    }

    /// Choose the history snapshot granularity.
    pub fn with_history_scope(mut self, scope: HistoryScope) -> Self {
        self.history = History::with_scope(scope);
        self
    }

    /// Set the active tool. Committed strokes keep their own snapshots.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// The transient shape preview, if a drag is in progress. Never part of
    /// the document.
    pub fn preview_stroke(&self) -> Option<&Stroke> {
        self.preview.as_ref()
    }

    /// The current gesture state.
    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    /// Feed one pointer event through the input state machine.
    ///
    /// Returns true when the canvas needs a redraw. Events from pointers
    /// other than the captured one are ignored until release.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down {
                pointer,
                x,
                y,
                device,
            } => {
                if !self.gesture.is_idle() {
                    return false;
                }
                let point = self.surface.normalize(x, y, device);
                self.begin_gesture(pointer, point)
            }
            PointerEvent::Move {
                pointer,
                x,
                y,
                device,
            } => {
                if self.gesture.captured_pointer() != Some(pointer) {
                    return false;
                }
                let point = self.surface.normalize(x, y, device);
                self.update_gesture(point)
            }
            PointerEvent::Up {
                pointer,
                x,
                y,
                device,
            } => {
                if self.gesture.captured_pointer() != Some(pointer) {
                    return false;
                }
                let point = self.surface.normalize(x, y, device);
                self.finish_gesture(Some(point))
            }
            PointerEvent::Leave { pointer } => {
                if self.gesture.captured_pointer() != Some(pointer) {
                    return false;
                }
                // No orphaned gestures: leave behaves like a release at the
                // last known position.
                self.finish_gesture(None)
            }
        }
    }

    fn begin_gesture(&mut self, pointer: u64, point: SamplePoint) -> bool {
        match self.tool.kind {
            ToolKind::Pen | ToolKind::Eraser => {
                self.history.push(&self.document);
                let stroke = Stroke::new(self.tool, point);
                if self.config.auto_convert {
                    self.pending.push(stroke.id);
                }
                self.gesture = GestureState::DrawingFreehand {
                    pointer,
                    stroke: stroke.id,
                };
                self.document.add_stroke(stroke);
                true
            }
            ToolKind::Rectangle | ToolKind::Circle => {
                self.gesture = GestureState::DraggingShape {
                    pointer,
                    tool: self.tool,
                    anchor: point,
                    current: point,
                };
                self.preview = Some(Stroke::from_drag(self.tool, point, point));
                true
            }
            // Text entries are placed by the host, not drawn with a gesture.
            ToolKind::Text => false,
        }
    }

    fn update_gesture(&mut self, point: SamplePoint) -> bool {
        match &mut self.gesture {
            GestureState::DrawingFreehand { stroke, .. } => {
                let id = *stroke;
                if let Some(stroke) = self.document.stroke_mut(id) {
                    stroke.add_point(point);
                }
                true
            }
            GestureState::DraggingShape {
                tool,
                anchor,
                current,
                ..
            } => {
                *current = point;
                self.preview = Some(Stroke::from_drag(*tool, *anchor, point));
                true
            }
            GestureState::Idle => false,
        }
    }

    fn finish_gesture(&mut self, release: Option<SamplePoint>) -> bool {
        match std::mem::take(&mut self.gesture) {
            GestureState::DrawingFreehand { stroke, .. } => {
                let smoothing = self.config.stroke_smoothing;
                if let Some(stroke) = self.document.stroke_mut(stroke) {
                    if smoothing && stroke.tool.kind == ToolKind::Pen && stroke.points.len() > 2 {
                        stroke.freeze_smoothed();
                    }
                }
                // The gesture end time drives the recognition debounce.
                if self.config.auto_convert {
                    self.pending.arm(Instant::now());
                }
                true
            }
            GestureState::DraggingShape {
                tool,
                anchor,
                current,
                ..
            } => {
                let release = release.unwrap_or(current);
                self.history.push(&self.document);
                self.document
                    .add_stroke(Stroke::from_drag(tool, anchor, release));
                self.preview = None;
                true
            }
            GestureState::Idle => false,
        }
    }

    /// Undo the last committed action. No-op on an empty stack.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.document)
    }

    /// Redo the last undone action. No-op on an empty stack.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.document)
    }

    /// Open a document from storage.
    ///
    /// A failed load is reported and falls back to an empty document; it
    /// never propagates to the host.
    pub async fn open(storage: &dyn Storage, id: &str) -> Self {
        match storage.load(id).await {
            Ok(document) => Self::with_document(document),
            Err(e) => {
                log::warn!("failed to load document {}: {}", id, e);
                Self::new()
            }
        }
    }

    /// Save the document to storage (explicit save action; the engine never
    /// auto-saves). On failure the in-memory document is untouched and the
    /// error is surfaced to the host.
    pub async fn save(&self, storage: &dyn Storage, id: &str) -> StorageResult<()> {
        storage.save(id, &self.document).await
    }

    /// Wipe the live document: strokes, converted texts, pending recognition
    /// work, and displayed overlays. The pre-clear strokes go onto the undo
    /// stack; the redo stack is emptied.
    pub fn clear(&mut self) {
        self.history.push(&self.document);
        self.document.strokes.clear();
        self.document.converted_texts.clear();
        self.pending.clear();
        self.overlays.clear();
        self.preview = None;
        self.gesture = GestureState::Idle;
    }
}
