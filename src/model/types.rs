//! Core type definitions for the playback session.

/// Case-insensitive title substring excluded from playlists, search results
/// and shuffle candidates.
const FILTERED_TITLE_MARKER: &str = "music video";

/// A resolved reference to one playable media item, not yet bound to a
/// concrete stream. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackRequest {
    /// The query text that produced this track.
    pub raw_query: String,
    /// Canonical page URL handed back to the extractor when it is time to
    /// pick a stream.
    pub canonical_url: String,
    pub title: Option<String>,
}

impl TrackRequest {
    pub fn new(
        raw_query: impl Into<String>,
        canonical_url: impl Into<String>,
        title: Option<String>,
    ) -> Self {
        Self {
            raw_query: raw_query.into(),
            canonical_url: canonical_url.into(),
            title,
        }
    }

    /// Best human-readable name for replies and logs.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.canonical_url)
    }

    /// Whether the track is excluded by the title filter.
    pub fn is_filtered(&self) -> bool {
        self.title
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(FILTERED_TITLE_MARKER))
    }
}

/// The concrete, directly-playable stream URL selected from a track's
/// available formats. Derived right before playback and discarded once the
/// sink accepts it.
#[derive(Clone, Debug)]
pub struct PlayableStream {
    pub stream_url: String,
    pub source: TrackRequest,
}

/// Session playback mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlayMode {
    #[default]
    Idle,
    Playing,
}

/// The track currently handed to the sink, tagged with the play ticket its
/// completion event must match.
#[derive(Clone, Debug)]
pub struct ActiveTrack {
    pub track: TrackRequest,
    pub ticket: u64,
}
