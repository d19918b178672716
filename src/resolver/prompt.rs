//! Interactive disambiguation for free-text searches.

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc, oneshot};

use crate::model::TrackRequest;

/// One bounded wait for a user to pick among search candidates.
///
/// `pick` is awaited at most once per search; the resolver enforces the
/// deadline and calls `withdraw` when it fires so any affordance the prompt
/// created can be released.
#[async_trait]
pub trait SelectionPrompt: Send + Sync {
    /// Presents `candidates` and waits for a zero-based pick. `None` means
    /// the prompt was abandoned.
    async fn pick(&self, candidates: &[TrackRequest]) -> Option<usize>;

    /// Releases whatever `pick` put in front of the user.
    async fn withdraw(&self) {}
}

/// Prompt backed by the user reply channel: candidates are printed as a
/// notice and the selection arrives through [`ChannelPrompt::submit`]
/// (the `choose <n>` command).
pub struct ChannelPrompt {
    notices: mpsc::UnboundedSender<String>,
    pending: Mutex<Option<oneshot::Sender<usize>>>,
}

impl ChannelPrompt {
    pub fn new(notices: mpsc::UnboundedSender<String>) -> Self {
        Self {
            notices,
            pending: Mutex::new(None),
        }
    }

    /// Forwards a zero-based pick to the waiting search, if any. Returns
    /// false when nothing is waiting.
    pub async fn submit(&self, index: usize) -> bool {
        match self.pending.lock().await.take() {
            Some(reply) => reply.send(index).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl SelectionPrompt for ChannelPrompt {
    async fn pick(&self, candidates: &[TrackRequest]) -> Option<usize> {
        let (reply_tx, reply_rx) = oneshot::channel();
        *self.pending.lock().await = Some(reply_tx);

        let listing = candidates
            .iter()
            .enumerate()
            .map(|(i, track)| format!("  {}. {}", i + 1, track.display_title()))
            .collect::<Vec<_>>()
            .join("\n");
        let _ = self
            .notices
            .send(format!("Pick a track with `choose <n>`:\n{listing}"));

        reply_rx.await.ok()
    }

    async fn withdraw(&self) {
        if self.pending.lock().await.take().is_some() {
            let _ = self
                .notices
                .send("Selection timed out, nothing was queued.".to_string());
        }
    }
}
