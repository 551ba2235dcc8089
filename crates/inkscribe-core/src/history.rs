//! Undo/redo history over full document snapshots.

use crate::document::Document;
use crate::stroke::{ConvertedText, Stroke};
use serde::{Deserialize, Serialize};

/// Maximum number of undo states to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// What a history snapshot captures.
///
/// The reference behavior tracks stroke-level history only, treating
/// recognition output as derived data. `FullDocument` also snapshots the
/// converted texts; see DESIGN.md for the rationale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HistoryScope {
    /// Snapshots cover `Document::strokes` only (reference behavior).
    #[default]
    StrokesOnly,
    /// Snapshots cover strokes and converted texts.
    FullDocument,
}

/// A single history entry.
#[derive(Debug, Clone)]
struct Snapshot {
    strokes: Vec<Stroke>,
    /// Captured only under [`HistoryScope::FullDocument`].
    converted_texts: Option<Vec<ConvertedText>>,
}

/// Undo/redo stacks of pre-mutation document snapshots.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    scope: HistoryScope,
}

impl History {
    /// Create a history with the reference (strokes-only) granularity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history with an explicit snapshot granularity.
    pub fn with_scope(scope: HistoryScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn scope(&self) -> HistoryScope {
        self.scope
    }

    fn snapshot(&self, document: &Document) -> Snapshot {
        Snapshot {
            strokes: document.strokes.clone(),
            converted_texts: match self.scope {
                HistoryScope::StrokesOnly => None,
                HistoryScope::FullDocument => Some(document.converted_texts.clone()),
            },
        }
    }

    fn restore(&self, snapshot: Snapshot, document: &mut Document) {
        document.strokes = snapshot.strokes;
        if let Some(texts) = snapshot.converted_texts {
            document.converted_texts = texts;
        }
    }

    /// Push the current (pre-mutation) state onto the undo stack.
    ///
    /// Call before every committed mutating action. Clears the redo stack and
    /// drops the oldest entry past the capacity cap.
    pub fn push(&mut self, document: &Document) {
        self.undo_stack.push(self.snapshot(document));
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last change. Returns false (and leaves the document alone)
    /// when there is nothing to undo.
    pub fn undo(&mut self, document: &mut Document) -> bool {
        match self.undo_stack.pop() {
            Some(snapshot) => {
                self.redo_stack.push(self.snapshot(document));
                self.restore(snapshot, document);
                true
            }
            None => false,
        }
    }

    /// Redo the last undone change. Returns false when there is nothing to
    /// redo.
    pub fn redo(&mut self, document: &mut Document) -> bool {
        match self.redo_stack.pop() {
            Some(snapshot) => {
                self.undo_stack.push(self.snapshot(document));
                self.restore(snapshot, document);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of entries on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of entries on the redo stack.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}
