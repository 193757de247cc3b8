// src/engine/queue.rs

use std::collections::VecDeque;

use tracing::debug;

use super::TriggerReason;

/// Triggers that arrived while a cycle was running.
///
/// Semantics:
/// - Each entry stands for one follow-up cycle, run oldest first.
/// - Every manual trigger keeps its own entry; an operator pressing Enter
///   three times during a build gets three more builds.
/// - File-change triggers are bounded by `max_pending`. Once that many are
///   waiting, further changes are already covered by a pending rebuild and
///   are dropped, so a burst of saves during a long build causes one
///   rebuild, not many.
#[derive(Debug)]
pub struct TriggerQueue {
    max_pending: usize,
    pending: VecDeque<TriggerReason>,
}

impl TriggerQueue {
    /// `max_pending` is clamped to at least 1.
    pub fn new(max_pending: usize) -> Self {
        Self {
            max_pending: max_pending.max(1),
            pending: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Bound on pending file-change cycles.
    pub fn max_pending(&self) -> usize {
        self.max_pending
    }

    /// Remember a trigger for a future cycle.
    pub fn record_trigger(&mut self, reason: TriggerReason) {
        if reason != TriggerReason::Manual && self.pending_changes() >= self.max_pending {
            debug!(%reason, pending = self.pending.len(), "file-change cycle already pending; coalescing");
            return;
        }
        self.pending.push_back(reason);
        debug!(%reason, pending = self.pending.len(), "queued follow-up cycle");
    }

    /// Next follow-up cycle, oldest first.
    pub fn pop(&mut self) -> Option<TriggerReason> {
        self.pending.pop_front()
    }

    fn pending_changes(&self) -> usize {
        self.pending
            .iter()
            .filter(|r| **r != TriggerReason::Manual)
            .count()
    }
}
