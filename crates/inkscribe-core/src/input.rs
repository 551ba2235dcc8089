//! Pointer input events and gesture state.

use crate::geometry::{PointerDevice, SamplePoint};
use crate::stroke::{StrokeId, Tool};
use serde::{Deserialize, Serialize};

/// A pointer event in client coordinates, tagged with the pointer id that
/// produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        pointer: u64,
        x: f64,
        y: f64,
        device: PointerDevice,
    },
    Move {
        pointer: u64,
        x: f64,
        y: f64,
        device: PointerDevice,
    },
    Up {
        pointer: u64,
        x: f64,
        y: f64,
        device: PointerDevice,
    },
    /// The pointer left the surface while a gesture may be active. Treated
    /// identically to `Up` at the last known position.
    Leave { pointer: u64 },
}

impl PointerEvent {
    /// The id of the pointer this event belongs to.
    pub fn pointer(&self) -> u64 {
        match self {
            PointerEvent::Down { pointer, .. }
            | PointerEvent::Move { pointer, .. }
            | PointerEvent::Up { pointer, .. }
            | PointerEvent::Leave { pointer } => *pointer,
        }
    }
}

/// The gesture the input machine is currently tracking.
///
/// A single pointer is captured on `Down`; events from other pointers are
/// ignored until it releases.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    /// No active gesture.
    #[default]
    Idle,
    /// A freehand (Pen/Eraser) stroke is being sampled.
    DrawingFreehand {
        pointer: u64,
        stroke: StrokeId,
    },
    /// A two-point shape drag is in progress. Nothing is committed yet.
    DraggingShape {
        pointer: u64,
        /// Tool captured at pointer-down, so mid-drag tool changes cannot
        /// alter the gesture.
        tool: Tool,
        anchor: SamplePoint,
        current: SamplePoint,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    /// The pointer id captured by the active gesture, if any.
    pub fn captured_pointer(&self) -> Option<u64> {
        match self {
            GestureState::Idle => None,
            GestureState::DrawingFreehand { pointer, .. }
            | GestureState::DraggingShape { pointer, .. } => Some(*pointer),
        }
    }
}
