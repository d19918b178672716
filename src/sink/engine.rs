//! Rodio-backed audio sink.
//!
//! A dedicated playback thread owns the audio output stream (which must stay
//! alive for the duration of the process and is not `Send`); the async side
//! talks to it over a command channel. The thread polls the rodio sink on a
//! short tick to detect end-of-stream and fires the completion handle from
//! there.

use std::io::Cursor;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::error::SinkError;
use crate::model::PlayableStream;

use super::{AudioSink, CompletionHandle, DoneKind};

const TICK_MS: u64 = 200;

type StreamDecoder = Decoder<Cursor<Vec<u8>>>;

enum EngineCommand {
    Play {
        decoder: StreamDecoder,
        gain: f32,
        done: CompletionHandle,
    },
    Stop,
    SetGain(f32),
    Shutdown,
}

/// Production [`AudioSink`] playing through the default audio device.
///
/// Streams are fetched fully before decoding; the extractor already picked an
/// audio-only format, so the payload stays modest.
pub struct RodioSink {
    commands: Sender<EngineCommand>,
    http: reqwest::Client,
}

impl RodioSink {
    /// Spawns the playback thread and opens the default output device on it.
    pub fn new() -> Result<Self, SinkError> {
        let (command_tx, command_rx) = std::sync::mpsc::channel();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();

        std::thread::Builder::new()
            .name("jukebot-audio".to_string())
            .spawn(move || match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    Engine::new(stream).run(command_rx);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("failed to open audio output: {e}")));
                }
            })
            .map_err(|e| SinkError::Output(format!("failed to spawn playback thread: {e}")))?;

        ready_rx
            .recv()
            .map_err(|_| SinkError::Output("playback thread died during startup".into()))?
            .map_err(SinkError::Output)?;

        Ok(Self {
            commands: command_tx,
            http: reqwest::Client::new(),
        })
    }

    fn send(&self, command: EngineCommand) -> Result<(), SinkError> {
        self.commands
            .send(command)
            .map_err(|_| SinkError::Output("playback thread is gone".into()))
    }
}

#[async_trait]
impl AudioSink for RodioSink {
    async fn play(
        &self,
        stream: PlayableStream,
        gain: f32,
        done: CompletionHandle,
    ) -> Result<(), SinkError> {
        let response = self
            .http
            .get(&stream.stream_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SinkError::Fetch(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SinkError::Fetch(e.to_string()))?;

        debug!(
            track = %stream.source.display_title(),
            bytes = bytes.len(),
            "stream fetched"
        );

        let decoder = Decoder::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| SinkError::Output(format!("undecodable stream: {e}")))?;

        self.send(EngineCommand::Play {
            decoder,
            gain,
            done,
        })
    }

    async fn stop(&self) {
        if self.send(EngineCommand::Stop).is_err() {
            warn!("stop ignored: playback thread is gone");
        }
    }

    async fn set_gain(&self, gain: f32) {
        if self.send(EngineCommand::SetGain(gain)).is_err() {
            warn!("gain change ignored: playback thread is gone");
        }
    }
}

impl Drop for RodioSink {
    fn drop(&mut self) {
        let _ = self.commands.send(EngineCommand::Shutdown);
    }
}

/// State owned by the playback thread.
struct Engine {
    // Must stay alive as long as anything plays.
    stream: OutputStream,
    sink: Option<Sink>,
    done: Option<CompletionHandle>,
}

impl Engine {
    fn new(stream: OutputStream) -> Self {
        Self {
            stream,
            sink: None,
            done: None,
        }
    }

    fn run(mut self, commands: Receiver<EngineCommand>) {
        let tick = Duration::from_millis(TICK_MS);

        loop {
            match commands.recv_timeout(tick) {
                Ok(command) => {
                    if self.handle(command) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            self.tick();
        }

        self.halt();
        debug!("playback thread exiting");
    }

    fn handle(&mut self, command: EngineCommand) -> bool {
        match command {
            EngineCommand::Play {
                decoder,
                gain,
                done,
            } => {
                // Replacing an active stream counts as stopping it.
                self.halt();

                let sink = Sink::connect_new(self.stream.mixer());
                sink.set_volume(gain);
                sink.append(decoder);
                sink.play();

                self.sink = Some(sink);
                self.done = Some(done);
            }
            EngineCommand::Stop => self.halt(),
            EngineCommand::SetGain(gain) => {
                if let Some(sink) = &self.sink {
                    sink.set_volume(gain);
                }
            }
            EngineCommand::Shutdown => return true,
        }

        false
    }

    /// Detects end-of-stream and fires the completion subscription.
    fn tick(&mut self) {
        let finished = self.sink.as_ref().is_some_and(|sink| sink.empty());
        if finished {
            self.sink = None;
            if let Some(done) = self.done.take() {
                done.complete(DoneKind::Finished);
            }
        }
    }

    fn halt(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        if let Some(done) = self.done.take() {
            done.complete(DoneKind::Stopped);
        }
    }
}
