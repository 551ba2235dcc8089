//! Debounced batch of strokes awaiting auto-conversion.

use crate::stroke::StrokeId;
use std::time::{Duration, Instant};

/// Quiet period after the last committed stroke before a batch fires.
pub const AUTO_CONVERT_DEBOUNCE: Duration = Duration::from_millis(2000);

/// The pending auto-conversion queue.
///
/// Stroke ids accumulate while auto-conversion is enabled; the single-shot
/// deadline is rearmed on every commit, so the batch fires only after the
/// debounce window elapses with no new strokes.
#[derive(Debug, Clone, Default)]
pub struct PendingBatch {
    ids: Vec<StrokeId>,
    deadline: Option<Instant>,
}

impl PendingBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly created stroke.
    pub fn push(&mut self, id: StrokeId) {
        self.ids.push(id);
    }

    /// Rearm the debounce deadline at a stroke commit. No-op while the queue
    /// is empty.
    pub fn arm(&mut self, now: Instant) {
        if !self.ids.is_empty() {
            self.deadline = Some(now + AUTO_CONVERT_DEBOUNCE);
        }
    }

    /// Take the batch if its deadline has passed. Clears the queue.
    pub fn take_due(&mut self, now: Instant) -> Option<Vec<StrokeId>> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(std::mem::take(&mut self.ids))
            }
            _ => None,
        }
    }

    /// Drop everything: queued ids and the armed deadline.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.deadline = None;
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// The ids currently queued, in commit order.
    pub fn ids(&self) -> &[StrokeId] {
        &self.ids
    }
}
