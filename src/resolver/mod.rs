//! Request resolution against the external media extractor.
//!
//! Turns user queries (direct URLs, playlist URLs, free text) into
//! [`TrackRequest`]s and, right before playback, into [`PlayableStream`]s.
//! Every extractor call goes through a bounded worker pool so that a slow
//! extraction never stalls the rest of the session.

mod prompt;
mod ytdlp;

pub use prompt::{ChannelPrompt, SelectionPrompt};
pub use ytdlp::YtDlpExtractor;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::model::{PlayableStream, TrackRequest};

/// One entry of the extractor's format list.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ExtractedFormat {
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Metadata returned by the extraction service for a URL or search request.
///
/// Playlist and search responses carry their items in `entries`; single-media
/// responses carry `formats` instead.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ExtractedInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub formats: Vec<ExtractedFormat>,
    #[serde(default)]
    pub entries: Option<Vec<ExtractedInfo>>,
}

impl ExtractedInfo {
    /// Builds a track request from this entry, if it carries a usable URL.
    fn to_track(&self, raw_query: &str) -> Option<TrackRequest> {
        let canonical = self
            .webpage_url
            .as_deref()
            .or(self.url.as_deref())
            .filter(|u| !u.is_empty())?;
        Some(TrackRequest::new(
            raw_query,
            canonical,
            self.title.clone(),
        ))
    }
}

/// The external extraction service. Production uses yt-dlp; tests substitute
/// a synchronous stub.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// `request` is either a media/playlist URL or a `ytsearchN:<text>`
    /// search expression.
    async fn extract(&self, request: &str) -> Result<ExtractedInfo, ResolveError>;
}

/// Which call site a search serves; shuffle uses a wider candidate net.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchTarget {
    Interactive,
    Shuffle,
}

/// Resolves queries into tracks and tracks into playable streams.
#[derive(Clone)]
pub struct TrackResolver {
    extractor: Arc<dyn MediaExtractor>,
    permits: Arc<Semaphore>,
    config: ResolverConfig,
}

impl TrackResolver {
    pub fn new(extractor: Arc<dyn MediaExtractor>, config: ResolverConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.worker_slots));
        Self {
            extractor,
            permits,
            config,
        }
    }

    /// Runs one extraction call under a worker-pool permit.
    async fn extract(&self, request: &str) -> Result<ExtractedInfo, ResolveError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ResolveError::ExtractionFailed("worker pool closed".into()))?;
        debug!(request, "running extraction");
        self.extractor.extract(request).await
    }

    /// Resolves a query into zero or more track requests.
    ///
    /// Direct URLs yield exactly one track whose canonical URL is the query
    /// itself; playlist URLs expand into their entries; free text runs a
    /// bounded top-N search. Playlist and search results drop entries whose
    /// title matches the exclusion filter; an emptied playlist is not an
    /// error, an emptied search is.
    pub async fn resolve(
        &self,
        query: &str,
        target: SearchTarget,
        prompt: Option<&dyn SelectionPrompt>,
    ) -> Result<Vec<TrackRequest>, ResolveError> {
        if is_media_url(query) {
            let info = self.extract(query).await?;
            return match info.entries {
                Some(entries) => {
                    let tracks: Vec<TrackRequest> = entries
                        .iter()
                        .filter_map(|entry| entry.to_track(query))
                        .filter(|track| !track.is_filtered())
                        .collect();
                    debug!(
                        total = entries.len(),
                        kept = tracks.len(),
                        "expanded playlist"
                    );
                    Ok(tracks)
                }
                None => Ok(vec![TrackRequest::new(query, query, info.title)]),
            };
        }

        let limit = match target {
            SearchTarget::Interactive => self.config.search_limit,
            SearchTarget::Shuffle => self.config.shuffle_search_limit,
        };
        let request = format!("ytsearch{limit}:{query}");
        let info = self.extract(&request).await?;
        let candidates: Vec<TrackRequest> = info
            .entries
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| entry.to_track(query))
            .filter(|track| !track.is_filtered())
            .collect();

        if candidates.is_empty() {
            return Err(ResolveError::NoResults);
        }
        if target == SearchTarget::Shuffle {
            return Ok(candidates);
        }

        match prompt {
            None => Ok(vec![candidates[0].clone()]),
            Some(prompt) => {
                let picked = self.await_selection(prompt, &candidates).await?;
                Ok(vec![picked])
            }
        }
    }

    /// Presents `candidates` for disambiguation and waits once, bounded by
    /// the configured timeout. The prompt's affordance is withdrawn if the
    /// deadline fires first.
    async fn await_selection(
        &self,
        prompt: &dyn SelectionPrompt,
        candidates: &[TrackRequest],
    ) -> Result<TrackRequest, ResolveError> {
        match tokio::time::timeout(self.config.selection_timeout, prompt.pick(candidates)).await {
            Ok(Some(index)) => candidates
                .get(index)
                .cloned()
                .ok_or(ResolveError::NoResults),
            Ok(None) => Err(ResolveError::SelectionTimeout),
            Err(_) => {
                warn!("selection prompt timed out");
                prompt.withdraw().await;
                Err(ResolveError::SelectionTimeout)
            }
        }
    }

    /// Extracts the format list for a track and picks a stream: a format
    /// matching the preferred codec when available, otherwise the first one
    /// whose audio codec is not `"none"`.
    pub async fn resolve_stream(
        &self,
        track: &TrackRequest,
    ) -> Result<PlayableStream, ResolveError> {
        let info = self.extract(&track.canonical_url).await?;

        let audio = |format: &&ExtractedFormat| {
            format.url.as_deref().is_some_and(|u| !u.is_empty())
                && format.acodec.as_deref() != Some("none")
        };
        let preferred = |format: &&ExtractedFormat| {
            format
                .acodec
                .as_deref()
                .is_some_and(|c| c.contains(&self.config.preferred_codec))
        };

        let stream_url = info
            .formats
            .iter()
            .filter(audio)
            .find(preferred)
            .or_else(|| info.formats.iter().find(audio))
            .and_then(|format| format.url.clone())
            .ok_or(ResolveError::NoAudioFormat)?;

        Ok(PlayableStream {
            stream_url,
            source: track.clone(),
        })
    }
}

fn is_media_url(query: &str) -> bool {
    query.starts_with("http://") || query.starts_with("https://")
}
