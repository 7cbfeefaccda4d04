//! FFmpeg diagnostics probe adapter
//!
//! Runs the media tool in analysis-only mode and scrapes the container
//! duration from its diagnostic stream.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::DurationParser;
use crate::ports::*;

/// Duration probe backed by a media tool port
pub struct FFmpegProbeAdapter {
    tool: Arc<dyn ToolPort>,
    strict: bool,
}

impl FFmpegProbeAdapter {
    /// Create new probe adapter; missing durations resolve to zero
    pub fn new(tool: Arc<dyn ToolPort>) -> Self {
        Self { tool, strict: false }
    }

    /// Fail with `ProbeAmbiguous` instead of returning zero
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Arguments for a decode-to-null pass that prints the input header
    pub fn probe_args(path: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            path.to_string_lossy().to_string(),
            "-hide_banner".to_string(),
            "-f".to_string(),
            "null".to_string(),
            "-".to_string(),
        ]
    }
}

#[async_trait]
impl ProbePort for FFmpegProbeAdapter {
    async fn probe_duration(&self, path: &Path) -> Result<MediaDuration, DomainError> {
        let output = self.tool.run_capturing(&Self::probe_args(path)).await?;
        debug!(path = %path.display(), code = ?output.status.code, "Probe finished");

        match DurationParser::parse_diagnostics(&output.diagnostics) {
            Some(duration) => Ok(duration),
            None if self.strict => Err(DomainError::ProbeAmbiguous(path.display().to_string())),
            None => {
                warn!(path = %path.display(), "No duration in probe output, using zero");
                Ok(MediaDuration::ZERO)
            }
        }
    }
}
