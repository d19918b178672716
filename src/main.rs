use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use jukebot::resolver::{ChannelPrompt, SelectionPrompt, TrackResolver, YtDlpExtractor};
use jukebot::session::{Command, HELP, SessionController};
use jukebot::sink::RodioSink;
use jukebot::voice::LocalVoiceLink;
use jukebot::{ResolverConfig, logging};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== jukebot starting ===");

    let config = ResolverConfig::from_env();
    config.validate()?;

    let extractor = Arc::new(YtDlpExtractor::new(&config));
    let sink = Arc::new(RodioSink::new()?);
    let voice = Arc::new(LocalVoiceLink::new());

    let (notice_tx, notice_rx) = mpsc::unbounded_channel();

    let prompt = config
        .prompt_selection
        .then(|| Arc::new(ChannelPrompt::new(notice_tx.clone())));

    let resolver = TrackResolver::new(extractor, config);
    let controller = SessionController::new(
        resolver,
        sink,
        voice,
        prompt
            .clone()
            .map(|p| p as Arc<dyn SelectionPrompt>),
        notice_tx,
    );

    println!("jukebot ready. Type `help` for commands.");
    run_repl(controller, prompt, notice_rx).await?;

    tracing::info!("jukebot shutting down");
    Ok(())
}

/// Line-based command loop: reads commands from stdin and interleaves
/// asynchronous notices (resolution results, track changes, prompts).
async fn run_repl(
    controller: SessionController,
    prompt: Option<Arc<ChannelPrompt>>,
    mut notices: mpsc::UnboundedReceiver<String>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(message) = notices.recv() => {
                println!("{message}");
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match Command::parse(line) {
                    Err(usage) => println!("{usage}"),
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Choose(index)) => {
                        let submitted = match &prompt {
                            Some(prompt) => prompt.submit(index).await,
                            None => false,
                        };
                        if !submitted {
                            println!("Nothing is waiting for a selection.");
                        }
                    }
                    Ok(command) => {
                        if let Some(reply) = controller.run_command(command).await {
                            println!("{reply}");
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
