//! Completion event listener.
//!
//! The audio sink fires its completion subscription from its own playback
//! thread. The handle's send lands on the channel consumed here, so by the
//! time session state is touched we are back on the controller's
//! synchronization domain.

use tokio::sync::mpsc;
use tracing::debug;

use crate::model::PlayMode;
use crate::sink::PlaybackDone;

use super::SessionController;

impl SessionController {
    pub(crate) fn spawn_done_listener(&self, mut events: mpsc::UnboundedReceiver<PlaybackDone>) {
        let controller = self.clone();
        tokio::spawn(async move {
            while let Some(done) = events.recv().await {
                controller.on_track_done(done).await;
            }
            debug!("completion listener shutting down");
        });
    }

    /// Re-enters the sequencing loop for a finished or stopped track.
    ///
    /// Only an event carrying the active play ticket advances the session;
    /// anything else is a stale or duplicate notification and is dropped, so
    /// a completion can never advance the queue twice.
    pub(crate) async fn on_track_done(&self, done: PlaybackDone) {
        {
            let mut model = self.model.lock().await;
            match &model.active {
                Some(active) if active.ticket == done.ticket => {
                    debug!(
                        track = %active.track.display_title(),
                        kind = ?done.kind,
                        "track done"
                    );
                    model.active = None;
                    model.mode = PlayMode::Idle;
                }
                _ => {
                    debug!(ticket = done.ticket, kind = ?done.kind, "ignoring stale completion");
                    return;
                }
            }
        }

        self.play_next().await;
    }
}
