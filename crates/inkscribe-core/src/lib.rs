//! inkscribe core library
//!
//! Data structures and logic for the freehand annotation engine: point
//! normalization and smoothing, the stroke model, the pointer input state
//! machine, undo/redo history, and the persistence adapter.

pub mod canvas;
pub mod config;
pub mod document;
pub mod geometry;
pub mod history;
pub mod input;
pub mod pending;
pub mod storage;
pub mod stroke;

pub use canvas::Canvas;
pub use config::{CanvasConfig, PageSize};
pub use document::Document;
pub use geometry::{
    pressure_to_width, smooth, PointerDevice, SamplePoint, SurfaceGeometry,
};
pub use history::{History, HistoryScope};
pub use input::{GestureState, PointerEvent};
pub use pending::{PendingBatch, AUTO_CONVERT_DEBOUNCE};
pub use stroke::{
    ConvertedText, RecognitionResult, Rgb, Stroke, StrokeId, Tool, ToolKind,
};
