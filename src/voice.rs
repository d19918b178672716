//! Voice session attachment.
//!
//! The real voice-network plumbing lives outside this crate; the controller
//! only needs to know whether a session is attached and where. Connecting
//! while already attached moves the session instead of failing.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::SessionError;

#[async_trait]
pub trait VoiceLink: Send + Sync {
    /// Attaches to `target`, or moves there when already attached.
    async fn connect(&self, target: &str) -> Result<(), SessionError>;

    async fn disconnect(&self) -> Result<(), SessionError>;

    /// Name of the attached target, if any.
    async fn current(&self) -> Option<String>;
}

/// Voice link for the local output device; tracks attachment only.
#[derive(Default)]
pub struct LocalVoiceLink {
    attached: Mutex<Option<String>>,
}

impl LocalVoiceLink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoiceLink for LocalVoiceLink {
    async fn connect(&self, target: &str) -> Result<(), SessionError> {
        let mut attached = self.attached.lock().await;
        match attached.replace(target.to_string()) {
            Some(previous) if previous != target => {
                info!(from = %previous, to = %target, "moved voice session")
            }
            Some(_) => {}
            None => info!(target = %target, "joined voice session"),
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SessionError> {
        match self.attached.lock().await.take() {
            Some(target) => {
                info!(target = %target, "left voice session");
                Ok(())
            }
            None => Err(SessionError::NotConnected),
        }
    }

    async fn current(&self) -> Option<String> {
        self.attached.lock().await.clone()
    }
}
