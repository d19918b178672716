//! End-to-end session tests over the public API, with stubbed extraction and
//! audio output.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use jukebot::ResolverConfig;
use jukebot::error::{ResolveError, SinkError};
use jukebot::model::{PlayMode, PlayableStream};
use jukebot::resolver::{
    ChannelPrompt, ExtractedFormat, ExtractedInfo, MediaExtractor, SelectionPrompt, TrackResolver,
};
use jukebot::session::{Command, SessionController};
use jukebot::sink::{AudioSink, CompletionHandle, DoneKind};
use jukebot::voice::LocalVoiceLink;

struct MapExtractor(HashMap<String, ExtractedInfo>);

#[async_trait]
impl MediaExtractor for MapExtractor {
    async fn extract(&self, request: &str) -> Result<ExtractedInfo, ResolveError> {
        self.0
            .get(request)
            .cloned()
            .ok_or_else(|| ResolveError::ExtractionFailed(format!("no stub for {request}")))
    }
}

/// Records every play/gain call and lets tests end tracks on demand, firing
/// the completion subscription the way a real sink's playback thread would.
#[derive(Default)]
struct StubSink {
    played: Mutex<Vec<String>>,
    gains: Mutex<Vec<f32>>,
    handle: Mutex<Option<CompletionHandle>>,
}

#[async_trait]
impl AudioSink for StubSink {
    async fn play(
        &self,
        stream: PlayableStream,
        gain: f32,
        done: CompletionHandle,
    ) -> Result<(), SinkError> {
        self.played.lock().await.push(stream.stream_url);
        self.gains.lock().await.push(gain);
        if let Some(previous) = self.handle.lock().await.replace(done) {
            previous.complete(DoneKind::Stopped);
        }
        Ok(())
    }

    async fn stop(&self) {
        if let Some(handle) = self.handle.lock().await.take() {
            handle.complete(DoneKind::Stopped);
        }
    }

    async fn set_gain(&self, gain: f32) {
        self.gains.lock().await.push(gain);
    }
}

impl StubSink {
    async fn finish_current(&self) -> bool {
        match self.handle.lock().await.take() {
            Some(handle) => {
                handle.complete(DoneKind::Finished);
                true
            }
            None => false,
        }
    }

    async fn play_count(&self) -> usize {
        self.played.lock().await.len()
    }
}

struct Harness {
    controller: SessionController,
    sink: Arc<StubSink>,
    prompt: Arc<ChannelPrompt>,
    notices: mpsc::UnboundedReceiver<String>,
}

fn media_entry(url: &str, title: &str) -> (String, ExtractedInfo) {
    (
        url.to_string(),
        ExtractedInfo {
            title: Some(title.to_string()),
            formats: vec![ExtractedFormat {
                acodec: Some("opus".to_string()),
                url: Some(format!("{url}/stream")),
            }],
            ..Default::default()
        },
    )
}

fn search_entry(title: &str, url: &str) -> ExtractedInfo {
    ExtractedInfo {
        title: Some(title.to_string()),
        webpage_url: Some(url.to_string()),
        ..Default::default()
    }
}

async fn harness(responses: HashMap<String, ExtractedInfo>, with_prompt: bool) -> Harness {
    let (notice_tx, notices) = mpsc::unbounded_channel();
    let sink = Arc::new(StubSink::default());
    let voice = Arc::new(LocalVoiceLink::new());
    let prompt = Arc::new(ChannelPrompt::new(notice_tx.clone()));

    let resolver = TrackResolver::new(Arc::new(MapExtractor(responses)), ResolverConfig::default());
    let controller = SessionController::new(
        resolver,
        sink.clone(),
        voice,
        with_prompt.then(|| prompt.clone() as Arc<dyn SelectionPrompt>),
        notice_tx,
    );

    Harness {
        controller,
        sink,
        prompt,
        notices,
    }
}

async fn joined_harness(responses: HashMap<String, ExtractedInfo>, with_prompt: bool) -> Harness {
    let h = harness(responses, with_prompt).await;
    h.controller
        .run_command(Command::Join(Some("lounge".to_string())))
        .await;
    h
}

/// Polls until `condition` holds or two seconds pass.
async fn eventually<F, Fut>(condition: F) -> bool
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..400 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition().await
}

async fn drain_notices(notices: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut all = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        all.push(notice);
    }
    all
}

#[tokio::test]
async fn queued_tracks_play_in_fifo_order() {
    let responses = HashMap::from([
        media_entry("https://m/a", "A"),
        media_entry("https://m/b", "B"),
        media_entry("https://m/c", "C"),
    ]);
    let h = joined_harness(responses, false).await;

    h.controller.play("https://m/a").await;
    h.controller.play("https://m/b").await;
    h.controller.play("https://m/c").await;

    assert!(eventually(|| async { h.sink.play_count().await == 1 }).await);
    assert_eq!(h.controller.queue_snapshot().await.len(), 2);

    h.sink.finish_current().await;
    assert!(eventually(|| async { h.sink.play_count().await == 2 }).await);
    h.sink.finish_current().await;
    assert!(eventually(|| async { h.sink.play_count().await == 3 }).await);
    h.sink.finish_current().await;
    assert!(eventually(|| async { h.controller.mode().await == PlayMode::Idle }).await);

    assert_eq!(
        *h.sink.played.lock().await,
        [
            "https://m/a/stream",
            "https://m/b/stream",
            "https://m/c/stream"
        ]
    );
    assert!(h.controller.queue_snapshot().await.is_empty());
}

#[tokio::test]
async fn playlist_expansion_only_queues_surviving_entries() {
    let playlist = ExtractedInfo {
        entries: Some(vec![
            search_entry("X", "https://m/x"),
            search_entry("X (Music Video)", "https://m/xmv"),
            search_entry("y music video z", "https://m/ymvz"),
        ]),
        ..Default::default()
    };
    let responses = HashMap::from([
        ("https://playlist/1".to_string(), playlist),
        media_entry("https://m/x", "X"),
    ]);
    let h = joined_harness(responses, false).await;

    h.controller.play("https://playlist/1").await;

    assert!(eventually(|| async { h.sink.play_count().await == 1 }).await);
    assert_eq!(*h.sink.played.lock().await, ["https://m/x/stream"]);
    assert!(h.controller.queue_snapshot().await.is_empty());
}

#[tokio::test]
async fn unresolvable_head_still_plays_the_rest() {
    // No media stub for the first track, so its stream resolution fails.
    let playlist = ExtractedInfo {
        entries: Some(vec![
            search_entry("broken", "https://m/broken"),
            search_entry("B", "https://m/b"),
            search_entry("C", "https://m/c"),
        ]),
        ..Default::default()
    };
    let responses = HashMap::from([
        ("https://playlist/1".to_string(), playlist),
        media_entry("https://m/b", "B"),
        media_entry("https://m/c", "C"),
    ]);
    let mut h = joined_harness(responses, false).await;

    h.controller.play("https://playlist/1").await;

    assert!(eventually(|| async { h.sink.play_count().await == 1 }).await);
    assert_eq!(*h.sink.played.lock().await, ["https://m/b/stream"]);
    assert_eq!(h.controller.mode().await, PlayMode::Playing);

    let notices = drain_notices(&mut h.notices).await;
    assert!(
        notices.iter().any(|n| n.contains("Skipping")),
        "expected a skip report, got {notices:?}"
    );
}

#[tokio::test]
async fn play_without_voice_session_is_rejected() {
    let responses = HashMap::from([media_entry("https://m/a", "A")]);
    let mut h = harness(responses, false).await;

    h.controller.play("https://m/a").await;

    assert_eq!(h.sink.play_count().await, 0);
    assert_eq!(h.controller.mode().await, PlayMode::Idle);
    let notices = drain_notices(&mut h.notices).await;
    assert!(notices.iter().any(|n| n.contains("not connected")));
}

#[tokio::test]
async fn volume_is_validated_and_applied_live() {
    let responses = HashMap::from([media_entry("https://m/a", "A")]);
    let h = joined_harness(responses, false).await;

    h.controller.set_volume(60).await.unwrap();
    h.controller.play("https://m/a").await;
    assert!(eventually(|| async { h.sink.play_count().await == 1 }).await);

    // The stream started with the stored gain.
    assert_eq!(h.sink.gains.lock().await.first().copied(), Some(0.6));

    // Out-of-range is rejected with no state change and no live update.
    assert!(h.controller.set_volume(150).await.is_err());
    assert_eq!(h.controller.volume_percent().await, 60);
    assert_eq!(h.sink.gains.lock().await.len(), 1);

    // A valid change while playing reaches the sink immediately.
    h.controller.set_volume(25).await.unwrap();
    assert_eq!(h.sink.gains.lock().await.last().copied(), Some(0.25));
}

#[tokio::test]
async fn skip_advances_through_the_completion_path() {
    let responses = HashMap::from([
        media_entry("https://m/a", "A"),
        media_entry("https://m/b", "B"),
    ]);
    let h = joined_harness(responses, false).await;

    h.controller.play("https://m/a").await;
    h.controller.play("https://m/b").await;
    assert!(eventually(|| async { h.sink.play_count().await == 1 }).await);

    let skipped = h.controller.skip().await.unwrap();
    assert_eq!(skipped.canonical_url, "https://m/a");

    assert!(eventually(|| async { h.sink.play_count().await == 2 }).await);
    assert_eq!(
        *h.sink.played.lock().await,
        ["https://m/a/stream", "https://m/b/stream"]
    );

    // Nothing left to skip once the queue is done.
    h.sink.finish_current().await;
    assert!(eventually(|| async { h.controller.mode().await == PlayMode::Idle }).await);
    assert!(h.controller.skip().await.is_none());
}

#[tokio::test]
async fn shuffle_cycles_candidates_until_stopped() {
    let search = ExtractedInfo {
        entries: Some(vec![
            search_entry("A", "https://m/a"),
            search_entry("B", "https://m/b"),
        ]),
        ..Default::default()
    };
    let responses = HashMap::from([
        ("ytsearch10:mix".to_string(), search),
        media_entry("https://m/a", "A"),
        media_entry("https://m/b", "B"),
    ]);
    let h = joined_harness(responses, false).await;

    h.controller.start_shuffle(Some("mix")).await;
    assert!(eventually(|| async { h.sink.play_count().await == 1 }).await);

    h.sink.finish_current().await;
    assert!(eventually(|| async { h.sink.play_count().await == 2 }).await);
    h.sink.finish_current().await;
    assert!(eventually(|| async { h.sink.play_count().await == 3 }).await);

    // Wrapped back to the first candidate.
    assert_eq!(
        *h.sink.played.lock().await,
        [
            "https://m/a/stream",
            "https://m/b/stream",
            "https://m/a/stream"
        ]
    );

    assert!(h.controller.stop_shuffle().await);
    h.sink.finish_current().await;
    assert!(eventually(|| async { h.controller.mode().await == PlayMode::Idle }).await);
    assert_eq!(h.sink.play_count().await, 3);
}

#[tokio::test]
async fn second_shuffle_start_is_rejected() {
    let search = ExtractedInfo {
        entries: Some(vec![search_entry("A", "https://m/a")]),
        ..Default::default()
    };
    let responses = HashMap::from([
        ("ytsearch10:mix".to_string(), search),
        media_entry("https://m/a", "A"),
    ]);
    let mut h = joined_harness(responses, false).await;

    h.controller.start_shuffle(Some("mix")).await;
    assert!(eventually(|| async { h.controller.shuffle_active().await }).await);

    h.controller.start_shuffle(Some("mix")).await;
    let notices = drain_notices(&mut h.notices).await;
    assert!(notices.iter().any(|n| n.contains("already active")));
    assert!(h.controller.shuffle_active().await);
}

#[tokio::test]
async fn all_filtered_shuffle_stops_instead_of_spinning() {
    // Direct URLs are queued unfiltered; shuffling the queue then has no
    // playable candidate.
    let responses = HashMap::from([
        media_entry("https://m/mv1", "first music video"),
        media_entry("https://m/mv2", "second Music Video"),
    ]);
    let mut h = joined_harness(responses, false).await;

    h.controller.enqueue("https://m/mv1").await;
    h.controller.enqueue("https://m/mv2").await;
    assert_eq!(h.controller.queue_snapshot().await.len(), 2);

    h.controller.start_shuffle(None).await;

    assert!(eventually(|| async { !h.controller.shuffle_active().await }).await);
    assert_eq!(h.controller.mode().await, PlayMode::Idle);
    assert_eq!(h.sink.play_count().await, 0);
    let notices = drain_notices(&mut h.notices).await;
    assert!(
        notices.iter().any(|n| n.contains("Shuffle stopped")),
        "expected a shuffle-stop report, got {notices:?}"
    );
}

#[tokio::test]
async fn interactive_search_waits_for_a_choice() {
    let search = ExtractedInfo {
        entries: Some(vec![
            search_entry("first hit", "https://m/1"),
            search_entry("second hit", "https://m/2"),
        ]),
        ..Default::default()
    };
    let responses = HashMap::from([
        ("ytsearch5:hit".to_string(), search),
        media_entry("https://m/2", "second hit"),
    ]);
    let mut h = joined_harness(responses, true).await;

    let controller = h.controller.clone();
    let play = tokio::spawn(async move { controller.play("hit").await });

    assert!(
        eventually(|| async { h.prompt.submit(1).await }).await,
        "prompt never became pending"
    );
    play.await.unwrap();

    assert!(eventually(|| async { h.sink.play_count().await == 1 }).await);
    assert_eq!(*h.sink.played.lock().await, ["https://m/2/stream"]);

    let notices = drain_notices(&mut h.notices).await;
    assert!(notices.iter().any(|n| n.contains("choose")));
}

#[tokio::test]
async fn queue_command_reports_pending_entries() {
    let responses = HashMap::from([
        media_entry("https://m/a", "Song A"),
        media_entry("https://m/b", "Song B"),
    ]);
    let h = joined_harness(responses, false).await;

    let empty = h.controller.run_command(Command::Queue(None)).await.unwrap();
    assert!(empty.contains("empty"));

    h.controller.enqueue("https://m/a").await;
    h.controller.enqueue("https://m/b").await;

    let listing = h.controller.run_command(Command::Queue(None)).await.unwrap();
    assert!(listing.contains("1. Song A"));
    assert!(listing.contains("2. Song B"));

    // Enqueue alone never starts playback.
    assert_eq!(h.sink.play_count().await, 0);
    assert_eq!(h.controller.mode().await, PlayMode::Idle);
}
