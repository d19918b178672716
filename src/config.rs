//! Extraction and resolution options.
//!
//! Replaces the loose option dictionaries the extractor tooling accepts with
//! an explicit structure enumerating the recognized knobs, validated once at
//! construction.

use std::time::Duration;

use crate::error::ConfigError;

/// Options driving [`crate::resolver::TrackResolver`] and the yt-dlp
/// extractor it talks to.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Extractor executable to invoke, normally `yt-dlp` on `$PATH`.
    pub program: String,
    /// Format selection expression handed to the extractor.
    pub format_preference: String,
    /// Audio codec favored when picking a stream from the format list.
    pub preferred_codec: String,
    /// Top-N bound for interactive free-text searches.
    pub search_limit: usize,
    /// Top-N bound for shuffle candidate searches.
    pub shuffle_search_limit: usize,
    /// How long an interactive disambiguation prompt waits for a pick.
    pub selection_timeout: Duration,
    /// Background worker slots for blocking extraction calls.
    pub worker_slots: usize,
    /// Present search candidates for disambiguation instead of auto-picking
    /// the first survivor.
    pub prompt_selection: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            format_preference: "bestaudio/best".to_string(),
            preferred_codec: "opus".to_string(),
            search_limit: 5,
            shuffle_search_limit: 10,
            selection_timeout: Duration::from_secs(30),
            worker_slots: 5,
            prompt_selection: false,
        }
    }
}

impl ResolverConfig {
    /// Defaults with environment overrides applied.
    ///
    /// `JUKEBOT_YTDLP` points at an alternative extractor binary and
    /// `JUKEBOT_PROMPT=1` switches free-text searches to interactive
    /// disambiguation.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(program) = std::env::var("JUKEBOT_YTDLP") {
            if !program.is_empty() {
                config.program = program;
            }
        }
        if let Ok(flag) = std::env::var("JUKEBOT_PROMPT") {
            config.prompt_selection = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        config
    }

    /// Checks the option set once, so bad values surface at startup rather
    /// than mid-session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program.is_empty() {
            return Err(ConfigError::Invalid("extractor program is empty".into()));
        }
        if self.format_preference.is_empty() {
            return Err(ConfigError::Invalid("format preference is empty".into()));
        }
        if self.search_limit == 0 || self.shuffle_search_limit == 0 {
            return Err(ConfigError::Invalid(
                "search limits must be at least 1".into(),
            ));
        }
        if self.worker_slots == 0 {
            return Err(ConfigError::Invalid(
                "worker pool needs at least one slot".into(),
            ));
        }
        if self.selection_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "selection timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
