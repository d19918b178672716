//! Session module - the playback orchestration core
//!
//! One [`SessionController`] per voice session owns the play queue, the
//! shuffle session, the volume channel and the playback mode, and serializes
//! every mutation through a single mutex. It is organized into submodules by
//! responsibility:
//!
//! - `playback`: the sequencing state machine (`play_next`, skip, shuffle)
//! - `sink_events`: the listener that re-enters sequencing on completion
//! - `command`: the user-facing command surface

mod command;
mod playback;
mod sink_events;

pub use command::{Command, HELP};

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::model::SessionModel;
use crate::resolver::{SelectionPrompt, TrackResolver};
use crate::sink::{AudioSink, PlaybackDone};
use crate::voice::VoiceLink;

/// The per-session playback orchestrator.
///
/// Cheap to clone; all clones share the same session state. User-visible
/// outcomes of asynchronous work are reported through the notice channel
/// handed to [`SessionController::new`].
#[derive(Clone)]
pub struct SessionController {
    pub(crate) model: Arc<Mutex<SessionModel>>,
    pub(crate) resolver: Arc<TrackResolver>,
    pub(crate) sink: Arc<dyn AudioSink>,
    pub(crate) voice: Arc<dyn VoiceLink>,
    pub(crate) prompt: Option<Arc<dyn SelectionPrompt>>,
    pub(crate) notices: mpsc::UnboundedSender<String>,
    pub(crate) done_tx: mpsc::UnboundedSender<PlaybackDone>,
}

impl SessionController {
    /// Builds the controller and spawns its completion listener. Must run
    /// inside a tokio runtime.
    pub fn new(
        resolver: TrackResolver,
        sink: Arc<dyn AudioSink>,
        voice: Arc<dyn VoiceLink>,
        prompt: Option<Arc<dyn SelectionPrompt>>,
        notices: mpsc::UnboundedSender<String>,
    ) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let controller = Self {
            model: Arc::new(Mutex::new(SessionModel::new())),
            resolver: Arc::new(resolver),
            sink,
            voice,
            prompt,
            notices,
            done_tx,
        };
        controller.spawn_done_listener(done_rx);
        controller
    }

    /// Sends a user-visible message; delivery failures only mean the session
    /// front-end is gone.
    pub(crate) fn notify(&self, message: impl Into<String>) {
        let _ = self.notices.send(message.into());
    }
}
