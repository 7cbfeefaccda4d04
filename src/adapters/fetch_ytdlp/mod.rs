//! yt-dlp fetch adapter
//!
//! Delegates retrieval to the yt-dlp binary. Format selectors are passed
//! through verbatim.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::adapters::exec_ffmpeg::ProcessRunner;
use crate::domain::errors::*;
use crate::ports::*;

/// Flat playlist dump as printed by `--flat-playlist -J`
#[derive(Debug, Deserialize)]
struct PlaylistDump {
    #[serde(default)]
    entries: Vec<PlaylistEntry>,
}

#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    id: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
}

/// Extract entry URLs from a flat playlist dump. Entries without a URL fall
/// back to their id, which yt-dlp accepts as input.
pub fn parse_playlist_json(json: &str) -> Result<Vec<String>, DomainError> {
    let dump: PlaylistDump = serde_json::from_str(json)
        .map_err(|e| DomainError::BadArgs(format!("Failed to parse playlist listing: {}", e)))?;

    Ok(dump
        .entries
        .into_iter()
        .filter_map(|entry| entry.url.or(entry.webpage_url).or(entry.id))
        .filter(|url| !url.is_empty())
        .collect())
}

/// Last non-empty line of the tool's diagnostics, used as the failure reason
fn failure_reason(stderr: &str, code: Option<i32>) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("yt-dlp exited with {:?}", code))
}

/// yt-dlp based fetcher
pub struct YtDlpAdapter {
    runner: ProcessRunner,
}

impl YtDlpAdapter {
    /// Create new yt-dlp adapter
    pub fn new(binary: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            runner: ProcessRunner::new(binary).with_timeout(timeout),
        }
    }

    /// Arguments for a single-video download merged into mp4
    pub fn download_args(url: &str, format_selector: &str, destination: &Path) -> Vec<String> {
        vec![
            "-f".to_string(),
            format_selector.to_string(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "--no-playlist".to_string(),
            "-o".to_string(),
            destination.to_string_lossy().to_string(),
            url.to_string(),
        ]
    }

    /// Arguments for a flat JSON listing of a playlist
    pub fn playlist_args(url: &str) -> Vec<String> {
        vec![
            "--flat-playlist".to_string(),
            "-J".to_string(),
            url.to_string(),
        ]
    }
}

#[async_trait]
impl FetchPort for YtDlpAdapter {
    async fn fetch(
        &self,
        url: &str,
        format_selector: &str,
        destination: &Path,
    ) -> Result<PathBuf, DomainError> {
        info!(url, destination = %destination.display(), "Downloading");

        let to_fetch_failure = |e: DomainError| DomainError::FetchFailure {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let output = self
            .runner
            .execute(&Self::download_args(url, format_selector, destination), true)
            .await
            .map_err(to_fetch_failure)?;

        if !output.status.success() {
            return Err(DomainError::FetchFailure {
                url: url.to_string(),
                reason: failure_reason(&output.stderr, output.status.code),
            });
        }

        if !tokio::fs::try_exists(destination).await.unwrap_or(false) {
            return Err(DomainError::FetchFailure {
                url: url.to_string(),
                reason: format!("no file produced at {}", destination.display()),
            });
        }

        info!(destination = %destination.display(), "Downloaded");
        Ok(destination.to_path_buf())
    }

    async fn list_playlist(&self, url: &str) -> Result<Vec<String>, DomainError> {
        let output = self
            .runner
            .execute(&Self::playlist_args(url), true)
            .await
            .map_err(|e| DomainError::FetchFailure {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(DomainError::FetchFailure {
                url: url.to_string(),
                reason: failure_reason(&output.stderr, output.status.code),
            });
        }

        let entries = parse_playlist_json(&output.stdout)?;
        debug!(url, entries = entries.len(), "Listed playlist");
        Ok(entries)
    }
}
