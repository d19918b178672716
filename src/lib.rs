//! # jukebot
//!
//! Core of a chat-bot that plays requested audio media into a voice session.
//! Requests are resolved against an external media extractor (yt-dlp), queued,
//! and played through an audio sink that reports completion asynchronously.
//!
//! The interesting part lives in [`session::SessionController`]: a per-session
//! state machine that owns the play queue, the shuffle session and the volume
//! channel, offloads extraction to a bounded worker pool, and re-enters its
//! sequencing loop whenever the sink signals that a track has ended.

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod resolver;
pub mod session;
pub mod sink;
pub mod voice;

pub use config::ResolverConfig;
pub use error::{ConfigError, ResolveError, SessionError, SinkError};
pub use session::{Command, SessionController};
