//! Error types for the playback core.
//!
//! Resolution failures are recoverable per track: the session controller logs
//! them, reports them to the user channel and moves on to the next track.
//! Session errors are rejected at the command boundary with no state change.

use thiserror::Error;

/// Errors produced while turning a query into playable tracks or streams.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The extraction service call itself failed (process, network, parse).
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// The track has no format with a usable audio codec.
    #[error("no audio-capable format available")]
    NoAudioFormat,

    /// The user did not pick a search result before the deadline.
    #[error("selection timed out")]
    SelectionTimeout,

    /// The search (after filtering) produced nothing to play.
    #[error("no results matched the query")]
    NoResults,
}

/// Errors reported by the session controller at its command boundary.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not connected to a voice session")]
    NotConnected,

    #[error("a shuffle session is already active")]
    ShuffleAlreadyActive,

    /// Every shuffle candidate is filtered out; the session must stop
    /// instead of scanning forever.
    #[error("no playable shuffle candidate")]
    NoPlayableCandidate,

    #[error("volume must be between 0 and 100")]
    InvalidVolume,
}

/// Errors from the audio output pipeline.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("stream fetch failed: {0}")]
    Fetch(String),

    #[error("audio output error: {0}")]
    Output(String),
}

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
