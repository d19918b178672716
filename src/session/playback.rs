//! Playback sequencing and control methods.

use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::model::{ActiveTrack, NextTrack, PlayMode, TrackRequest};
use crate::resolver::SearchTarget;
use crate::sink::CompletionHandle;

use super::SessionController;

impl SessionController {
    /// Resolves `query`, queues the results and starts playback when the
    /// session is idle. Outcomes are reported through the notice channel.
    pub async fn play(&self, query: &str) {
        if self.voice.current().await.is_none() {
            self.notify(SessionError::NotConnected.to_string());
            return;
        }

        let Some(count) = self.resolve_into_queue(query).await else {
            return;
        };
        if count == 0 {
            return;
        }

        let start = {
            let model = self.model.lock().await;
            model.active.is_none() && !model.shuffle.is_active()
        };
        if start {
            self.play_next().await;
        }
    }

    /// Resolves `query` and appends the results without starting playback.
    pub async fn enqueue(&self, query: &str) {
        self.resolve_into_queue(query).await;
    }

    async fn resolve_into_queue(&self, query: &str) -> Option<usize> {
        match self
            .resolver
            .resolve(query, SearchTarget::Interactive, self.prompt.as_deref())
            .await
        {
            Ok(tracks) if tracks.is_empty() => {
                self.notify(format!("Nothing playable matched `{query}`."));
                Some(0)
            }
            Ok(tracks) => {
                let count = tracks.len();
                let first = tracks[0].display_title().to_string();
                let mut model = self.model.lock().await;
                for track in tracks {
                    model.queue.push(track);
                }
                drop(model);

                if count == 1 {
                    self.notify(format!("Queued: {first}"));
                } else {
                    self.notify(format!("Queued {count} tracks."));
                }
                Some(count)
            }
            Err(e) => {
                warn!(query, error = %e, "resolution failed");
                self.notify(format!("Could not resolve `{query}`: {e}"));
                None
            }
        }
    }

    /// Advances the session: picks the next track (shuffle session first,
    /// queue otherwise), binds it to a stream and hands it to the sink with a
    /// fresh completion subscription.
    ///
    /// A track that fails to resolve is reported and skipped; the loop is
    /// bounded by queue/shuffle exhaustion, so one bad entry never wedges the
    /// session.
    pub(crate) async fn play_next(&self) {
        if self.voice.current().await.is_none() {
            let mut model = self.model.lock().await;
            model.mode = PlayMode::Idle;
            drop(model);
            self.notify(SessionError::NotConnected.to_string());
            return;
        }

        loop {
            let track = {
                let mut model = self.model.lock().await;
                if model.active.is_some() {
                    return;
                }
                match model.next_track() {
                    NextTrack::Track(track) => {
                        model.mode = PlayMode::Playing;
                        track
                    }
                    NextTrack::Exhausted => {
                        model.mode = PlayMode::Idle;
                        debug!("queue exhausted, going idle");
                        return;
                    }
                    NextTrack::ShuffleDead => {
                        model.shuffle.stop();
                        model.mode = PlayMode::Idle;
                        drop(model);
                        warn!("shuffle session has no playable candidate left");
                        self.notify(format!(
                            "Shuffle stopped: {}",
                            SessionError::NoPlayableCandidate
                        ));
                        return;
                    }
                }
            };

            let stream = match self.resolver.resolve_stream(&track).await {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(track = %track.display_title(), error = %e, "stream resolution failed");
                    self.notify(format!("Skipping {}: {e}", track.display_title()));
                    continue;
                }
            };

            let (ticket, gain) = {
                let mut model = self.model.lock().await;
                let ticket = model.issue_ticket();
                model.active = Some(ActiveTrack {
                    track: track.clone(),
                    ticket,
                });
                model.mode = PlayMode::Playing;
                (ticket, model.volume.gain())
            };

            let done = CompletionHandle::new(ticket, self.done_tx.clone());
            match self.sink.play(stream, gain, done).await {
                Ok(()) => {
                    info!(track = %track.display_title(), ticket, "playback started");
                    self.notify(format!("Now playing: {}", track.display_title()));
                    return;
                }
                Err(e) => {
                    let mut model = self.model.lock().await;
                    if model
                        .active
                        .as_ref()
                        .is_some_and(|active| active.ticket == ticket)
                    {
                        model.active = None;
                    }
                    drop(model);
                    warn!(track = %track.display_title(), error = %e, "sink rejected stream");
                    self.notify(format!("Skipping {}: {e}", track.display_title()));
                }
            }
        }
    }

    /// Stops the active track. The sink's forced completion drives the next
    /// `play_next`, so skipping never advances the queue by itself.
    pub async fn skip(&self) -> Option<TrackRequest> {
        let active = {
            let model = self.model.lock().await;
            model.active.as_ref().map(|active| active.track.clone())
        };
        match active {
            Some(track) => {
                info!(track = %track.display_title(), "skip requested");
                self.sink.stop().await;
                Some(track)
            }
            None => None,
        }
    }

    /// Validates and stores a percent volume; the new gain is applied to the
    /// live output immediately when something is playing.
    pub async fn set_volume(&self, percent: i64) -> Result<f32, SessionError> {
        let (gain, playing) = {
            let mut model = self.model.lock().await;
            model.volume.set_percent(percent)?;
            (model.volume.gain(), model.active.is_some())
        };
        if playing {
            self.sink.set_gain(gain).await;
        }
        debug!(percent, gain, "volume changed");
        Ok(gain)
    }

    /// Starts a shuffle session over search candidates for `query`, or over
    /// the current queue contents when no query is given.
    pub async fn start_shuffle(&self, query: Option<&str>) {
        if self.voice.current().await.is_none() {
            self.notify(SessionError::NotConnected.to_string());
            return;
        }
        if self.model.lock().await.shuffle.is_active() {
            self.notify(SessionError::ShuffleAlreadyActive.to_string());
            return;
        }

        let candidates = match query {
            Some(query) => {
                match self
                    .resolver
                    .resolve(query, SearchTarget::Shuffle, None)
                    .await
                {
                    Ok(candidates) => candidates,
                    Err(e) => {
                        warn!(query, error = %e, "shuffle resolution failed");
                        self.notify(format!("Could not resolve `{query}`: {e}"));
                        return;
                    }
                }
            }
            None => self.model.lock().await.queue.snapshot(),
        };

        if candidates.is_empty() {
            self.notify("Nothing to shuffle.".to_string());
            return;
        }

        let start = {
            let mut model = self.model.lock().await;
            if let Err(e) = model.shuffle.start(candidates) {
                drop(model);
                self.notify(e.to_string());
                return;
            }
            info!(candidates = model.shuffle.candidate_count(), "shuffle started");
            model.active.is_none()
        };

        self.notify("Shuffle started.".to_string());
        if start {
            self.play_next().await;
        }
    }

    /// Deactivates the shuffle session; the active track plays out and the
    /// queue takes over afterwards. Returns false when no session was active.
    pub async fn stop_shuffle(&self) -> bool {
        let mut model = self.model.lock().await;
        if !model.shuffle.is_active() {
            return false;
        }
        model.shuffle.stop();
        info!("shuffle stopped");
        true
    }

    pub async fn queue_snapshot(&self) -> Vec<TrackRequest> {
        self.model.lock().await.queue.snapshot()
    }

    pub async fn now_playing(&self) -> Option<TrackRequest> {
        self.model
            .lock()
            .await
            .active
            .as_ref()
            .map(|active| active.track.clone())
    }

    pub async fn mode(&self) -> PlayMode {
        self.model.lock().await.mode
    }

    pub async fn volume_percent(&self) -> u8 {
        self.model.lock().await.volume.percent()
    }

    pub async fn shuffle_active(&self) -> bool {
        self.model.lock().await.shuffle.is_active()
    }
}
