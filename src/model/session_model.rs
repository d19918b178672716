//! Aggregate session state.

use super::queue::PlayQueue;
use super::shuffle::ShuffleSession;
use super::types::{ActiveTrack, PlayMode, TrackRequest};
use super::volume::VolumeState;

/// What the sequencing loop should do next.
#[derive(Debug)]
pub enum NextTrack {
    Track(TrackRequest),
    /// Neither the queue nor the shuffle session has anything left.
    Exhausted,
    /// The shuffle session is active but every candidate is filtered out;
    /// it must be stopped.
    ShuffleDead,
}

/// All mutable state of one playback session.
///
/// Owned exclusively by one `SessionController` behind a single mutex;
/// nothing here is touched from outside its synchronization domain.
#[derive(Debug, Default)]
pub struct SessionModel {
    pub queue: PlayQueue,
    pub shuffle: ShuffleSession,
    pub volume: VolumeState,
    pub mode: PlayMode,
    pub active: Option<ActiveTrack>,
    next_ticket: u64,
}

impl SessionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh ticket for the next completion subscription; completion events
    /// carrying any other ticket are stale and ignored.
    pub fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Picks the next track source: the shuffle session while one is active,
    /// the queue otherwise.
    pub fn next_track(&mut self) -> NextTrack {
        if self.shuffle.is_active() {
            match self.shuffle.advance() {
                Ok(track) => NextTrack::Track(track),
                Err(_) => NextTrack::ShuffleDead,
            }
        } else {
            match self.queue.pop_front() {
                Some(track) => NextTrack::Track(track),
                None => NextTrack::Exhausted,
            }
        }
    }
}
