//! Audio output boundary.
//!
//! The sink runs its own playback machinery (the production one owns a
//! dedicated thread) and reports the end of each track asynchronously through
//! a one-shot [`CompletionHandle`]. The handle may be fired from any thread;
//! its only action is a channel send, so session state is never touched from
//! the sink's execution context.

mod engine;

pub use engine::RodioSink;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::SinkError;
use crate::model::PlayableStream;

/// How the current track ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoneKind {
    /// Playback reached the end of the stream.
    Finished,
    /// Playback was forcibly stopped (skip, shutdown, replacement).
    Stopped,
}

/// Completion event delivered to the session controller's listener.
#[derive(Debug)]
pub struct PlaybackDone {
    pub(crate) ticket: u64,
    pub(crate) kind: DoneKind,
}

/// One-shot completion subscription handed to the sink with each stream.
///
/// Invoked exactly once, from an unspecified thread; consuming `self` makes a
/// second invocation unrepresentable. Dropping the handle without firing it
/// stands for a play attempt that never started.
#[derive(Debug)]
pub struct CompletionHandle {
    ticket: u64,
    events: mpsc::UnboundedSender<PlaybackDone>,
}

impl CompletionHandle {
    pub(crate) fn new(ticket: u64, events: mpsc::UnboundedSender<PlaybackDone>) -> Self {
        Self { ticket, events }
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Fires the subscription. Safe to call from any thread.
    pub fn complete(self, kind: DoneKind) {
        let _ = self.events.send(PlaybackDone {
            ticket: self.ticket,
            kind,
        });
    }
}

/// The external audio output pipeline.
///
/// `play` accepts at most one stream at a time; handing it a new stream
/// while one is active stops the old one first (firing its completion as
/// [`DoneKind::Stopped`]). `set_gain` applies to the live output without
/// interrupting it.
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn play(
        &self,
        stream: PlayableStream,
        gain: f32,
        done: CompletionHandle,
    ) -> Result<(), SinkError>;

    /// Forces the active completion subscription to fire with
    /// [`DoneKind::Stopped`]. No-op when nothing is playing.
    async fn stop(&self);

    async fn set_gain(&self, gain: f32);
}
