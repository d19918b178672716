//! The cycling shuffle session.

use crate::error::SessionError;

use super::types::TrackRequest;

/// Alternate "next track" source that cycles through a fixed candidate list
/// instead of draining the queue.
///
/// The cursor always stays in `[0, candidates.len())` while active; `advance`
/// wraps around at most once per call.
#[derive(Debug, Default)]
pub struct ShuffleSession {
    candidates: Vec<TrackRequest>,
    cursor: usize,
    active: bool,
}

impl ShuffleSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Activates the session over `candidates`, starting at the first one.
    pub fn start(&mut self, candidates: Vec<TrackRequest>) -> Result<(), SessionError> {
        if self.active {
            return Err(SessionError::ShuffleAlreadyActive);
        }
        self.candidates = candidates;
        self.cursor = 0;
        self.active = true;
        Ok(())
    }

    /// Deactivates the session and drops its candidates.
    pub fn stop(&mut self) {
        self.candidates.clear();
        self.cursor = 0;
        self.active = false;
    }

    /// Yields the next candidate, skipping filtered titles, wrapping around
    /// at most once.
    ///
    /// If every candidate is filtered out this is terminal for the session:
    /// the caller must stop shuffling rather than retry.
    pub fn advance(&mut self) -> Result<TrackRequest, SessionError> {
        if !self.active || self.candidates.is_empty() {
            return Err(SessionError::NoPlayableCandidate);
        }

        let len = self.candidates.len();
        for step in 0..len {
            let index = (self.cursor + step) % len;
            if !self.candidates[index].is_filtered() {
                self.cursor = (index + 1) % len;
                return Ok(self.candidates[index].clone());
            }
        }

        Err(SessionError::NoPlayableCandidate)
    }
}
