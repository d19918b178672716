//! The user-facing command surface.
//!
//! Each command maps 1:1 onto a controller, resolver or queue operation.
//! Long-running work (anything that talks to the extractor) is spawned so the
//! command loop stays responsive; its outcome arrives via the notice channel.

use super::SessionController;

pub const HELP: &str = "\
Commands:
  join [target]     attach to a voice session
  leave             detach from the voice session
  play <query>      queue a URL, playlist or search and start playing
  queue [query]     add without starting playback, or show the queue
  skip              stop the current track and move on
  volume <0-100>    set the output volume
  shuffle [query]   cycle search results (or the queue) endlessly
  shufflestop       end the shuffle session
  np                show the current track
  choose <n>        answer a pending search prompt
  help              this text
  quit              exit";

/// A parsed user command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Join(Option<String>),
    Leave,
    Play(String),
    Skip,
    /// With a query: enqueue without autoplay. Without: show the queue.
    Queue(Option<String>),
    Volume(i64),
    Shuffle(Option<String>),
    ShuffleStop,
    NowPlaying,
    Choose(usize),
    Help,
    Quit,
}

impl Command {
    /// Parses one input line; the error is a user-facing usage message.
    pub fn parse(line: &str) -> Result<Command, String> {
        let mut parts = line.split_whitespace();
        let head = parts
            .next()
            .ok_or_else(|| "Type `help` for commands.".to_string())?;
        let rest = parts.collect::<Vec<_>>().join(" ");
        let rest_opt = (!rest.is_empty()).then_some(rest.clone());

        match head {
            "join" => Ok(Command::Join(rest_opt)),
            "leave" => Ok(Command::Leave),
            "play" => {
                if rest.is_empty() {
                    Err("Usage: play <url or search terms>".to_string())
                } else {
                    Ok(Command::Play(rest))
                }
            }
            "skip" => Ok(Command::Skip),
            "queue" => Ok(Command::Queue(rest_opt)),
            "volume" => rest
                .parse::<i64>()
                .map(Command::Volume)
                .map_err(|_| "Usage: volume <0-100>".to_string()),
            "shuffle" => Ok(Command::Shuffle(rest_opt)),
            "shufflestop" => Ok(Command::ShuffleStop),
            "np" | "nowplaying" => Ok(Command::NowPlaying),
            "choose" => rest
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .map(Command::Choose)
                .ok_or_else(|| "Usage: choose <result number>".to_string()),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command `{other}`. Type `help`.")),
        }
    }
}

impl SessionController {
    /// Executes a command and returns the immediate reply, if any; spawned
    /// work reports later through the notice channel.
    ///
    /// `Choose`, `Help` and `Quit` concern the front-end and are expected to
    /// be handled before reaching the controller.
    pub async fn run_command(&self, command: Command) -> Option<String> {
        match command {
            Command::Join(target) => {
                let target = target.unwrap_or_else(|| "default".to_string());
                match self.voice.connect(&target).await {
                    Ok(()) => Some(format!("Joined `{target}`.")),
                    Err(e) => Some(e.to_string()),
                }
            }
            Command::Leave => match self.voice.disconnect().await {
                Ok(()) => {
                    self.sink.stop().await;
                    Some("Left the voice session.".to_string())
                }
                Err(e) => Some(e.to_string()),
            },
            Command::Play(query) => {
                let controller = self.clone();
                tokio::spawn(async move { controller.play(&query).await });
                Some("Looking it up...".to_string())
            }
            Command::Skip => match self.skip().await {
                Some(track) => Some(format!("Skipping {}.", track.display_title())),
                None => Some("Nothing is playing.".to_string()),
            },
            Command::Queue(Some(query)) => {
                let controller = self.clone();
                tokio::spawn(async move { controller.enqueue(&query).await });
                Some("Looking it up...".to_string())
            }
            Command::Queue(None) => {
                let pending = self.queue_snapshot().await;
                if pending.is_empty() {
                    Some("The queue is currently empty.".to_string())
                } else {
                    let listing = pending
                        .iter()
                        .enumerate()
                        .map(|(i, track)| format!("  {}. {}", i + 1, track.display_title()))
                        .collect::<Vec<_>>()
                        .join("\n");
                    Some(format!("Current queue:\n{listing}"))
                }
            }
            Command::Volume(percent) => match self.set_volume(percent).await {
                Ok(_) => Some(format!("Volume set to {percent}%.")),
                Err(e) => Some(e.to_string()),
            },
            Command::Shuffle(query) => {
                let controller = self.clone();
                tokio::spawn(async move { controller.start_shuffle(query.as_deref()).await });
                None
            }
            Command::ShuffleStop => {
                if self.stop_shuffle().await {
                    Some("Shuffle stopped; the queue takes over.".to_string())
                } else {
                    Some("No shuffle session is active.".to_string())
                }
            }
            Command::NowPlaying => match self.now_playing().await {
                Some(track) => Some(format!("Now playing: {}", track.display_title())),
                None => Some("Nothing is playing.".to_string()),
            },
            Command::Choose(_) => Some("Nothing is waiting for a selection.".to_string()),
            Command::Help => Some(HELP.to_string()),
            Command::Quit => None,
        }
    }
}
