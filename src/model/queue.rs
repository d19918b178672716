//! The FIFO play queue.

use std::collections::VecDeque;

use tracing::warn;

use super::types::TrackRequest;

/// Ordered sequence of pending tracks; insertion order is play order.
///
/// Single logical owner: the session controller. Entries leave only through
/// [`PlayQueue::pop_front`] and enter only through [`PlayQueue::push`]. No
/// capacity bound is enforced.
#[derive(Debug, Default)]
pub struct PlayQueue {
    entries: VecDeque<TrackRequest>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a track. Requests without a canonical URL are dropped to keep
    /// the queue invariant.
    pub fn push(&mut self, track: TrackRequest) {
        if track.canonical_url.is_empty() {
            warn!(query = %track.raw_query, "dropping track with empty canonical URL");
            return;
        }
        self.entries.push_back(track);
    }

    pub fn pop_front(&mut self) -> Option<TrackRequest> {
        self.entries.pop_front()
    }

    /// Read-only copy of the pending entries, in play order.
    pub fn snapshot(&self) -> Vec<TrackRequest> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
