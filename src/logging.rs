//! File-based logging setup.
//!
//! The REPL owns the terminal, so log output goes to a daily-rotated file
//! instead of stdout. The level can be controlled via the `RUST_LOG`
//! environment variable.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "jukebot";

/// Initialize the logging system.
///
/// Logs are written to `.logs/jukebot.YYYY-MM-DD.log` with daily rotation.
/// Default levels: `jukebot` modules at DEBUG, everything else at WARN.
pub fn init() -> anyhow::Result<()> {
    let log_dir = Path::new(LOG_DIR);
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE_PREFIX);

    // Non-blocking writer so the async runtime never stalls on log I/O.
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the guard alive for the lifetime of the process.
    Box::leak(Box::new(guard));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jukebot=debug,warn"));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Logging initialized - logs written to {}/", LOG_DIR);

    Ok(())
}
