//! yt-dlp extraction backend.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::ResolverConfig;
use crate::error::ResolveError;

use super::{ExtractedInfo, MediaExtractor};

/// Shells out to `yt-dlp -J` and parses its JSON dump.
///
/// `--flat-playlist` keeps playlist expansion to one round trip; single
/// media URLs still come back with their full format list.
pub struct YtDlpExtractor {
    program: String,
    format_preference: String,
}

impl YtDlpExtractor {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            program: config.program.clone(),
            format_preference: config.format_preference.clone(),
        }
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn extract(&self, request: &str) -> Result<ExtractedInfo, ResolveError> {
        let output = Command::new(&self.program)
            .arg("-J")
            .arg("--no-warnings")
            .arg("--flat-playlist")
            .arg("-f")
            .arg(&self.format_preference)
            .arg("--")
            .arg(request)
            .output()
            .await
            .map_err(|e| {
                ResolveError::ExtractionFailed(format!("failed to run {}: {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::ExtractionFailed(
                stderr.trim().lines().last().unwrap_or("unknown error").to_string(),
            ));
        }

        debug!(request, bytes = output.stdout.len(), "extractor responded");
        serde_json::from_slice(&output.stdout)
            .map_err(|e| ResolveError::ExtractionFailed(format!("unparseable extractor output: {e}")))
    }
}
