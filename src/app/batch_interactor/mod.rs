// Batch interactor - Runs the stack pipeline once per channel video

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::stack_interactor::{StackInteractor, StackRequest};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Summary written next to the per-video folders
pub const BATCH_REPORT_FILE: &str = "batch_report.json";

/// Folder under the final dir for the `position`-th selected video
pub fn video_dir_name(position: usize) -> String {
    format!("video_{:02}", position + 1)
}

/// Channel videos to process with shared run settings
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub channel: String,
    pub count: usize,
    pub skip: usize,
    /// Settings for every video; its primary is replaced per entry
    pub template: StackRequest,
}

impl BatchRequest {
    pub fn from_settings(settings: &Settings) -> Result<Self, DomainError> {
        let channel = settings
            .sources
            .channel
            .clone()
            .ok_or_else(|| DomainError::BadArgs("A channel URL is required".to_string()))?;
        let template = StackRequest::with_primary(settings, SourceSpec::Remote(channel.clone()))?;

        Ok(Self {
            channel,
            count: settings.sources.channel_count,
            skip: settings.sources.channel_skip,
            template,
        })
    }

    /// Stack request for one selected video, writing into its own folder
    pub fn video_request(&self, position: usize, url: &str) -> StackRequest {
        let mut request = self.template.clone();
        request.primary = SourceSpec::Remote(url.to_string());
        request.paths.final_dir = self.template.paths.final_dir.join(video_dir_name(position));
        request
    }
}

/// Outcome of one video's run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub position: usize,
    pub url: String,
    pub final_dir: PathBuf,
    pub outputs: usize,
    pub failed_pairs: usize,
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.failed_pairs == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub channel: String,
    pub skip: usize,
    pub count: usize,
    pub videos: Vec<BatchEntry>,
    pub error: Option<String>,
}

impl BatchReport {
    fn new(request: &BatchRequest) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            channel: request.channel.clone(),
            skip: request.skip,
            count: request.count,
            videos: Vec::new(),
            error: None,
        }
    }

    pub fn failed_videos(&self) -> usize {
        self.videos.iter().filter(|v| !v.succeeded()).count()
    }
}

/// Interactor for the channel batch use case
pub struct BatchInteractor {
    fetch_port: Arc<dyn FetchPort>,
    stack: Arc<StackInteractor>,
    fs_port: Arc<dyn FsPort>,
    log_port: Arc<dyn LogPort>,
}

impl BatchInteractor {
    pub fn new(
        fetch_port: Arc<dyn FetchPort>,
        stack: Arc<StackInteractor>,
        fs_port: Arc<dyn FsPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            fetch_port,
            stack,
            fs_port,
            log_port,
        }
    }

    /// Process the selected channel videos one after another. A failed video
    /// stops the batch unless merge failures are isolated, in which case it
    /// is recorded and the next video runs.
    pub async fn execute(&self, request: &BatchRequest) -> Result<BatchReport, DomainError> {
        let mut report = BatchReport::new(request);

        let outcome = self.run(request, &mut report).await;

        report.finished_at = Some(Utc::now());
        if let Err(e) = &outcome {
            self.log_port.error(&format!("Batch failed: {}", e)).await;
            report.error = Some(e.to_string());
        }

        self.write_report(&request.template.paths.final_dir, &report).await;
        outcome.map(|()| report)
    }

    async fn run(&self, request: &BatchRequest, report: &mut BatchReport) -> Result<(), DomainError> {
        let entries = self.fetch_port.list_playlist(&request.channel).await?;
        let available = entries.len();
        let selected: Vec<String> = entries
            .into_iter()
            .skip(request.skip)
            .take(request.count)
            .collect();
        if selected.is_empty() {
            return Err(DomainError::FetchFailure {
                url: request.channel.clone(),
                reason: format!(
                    "no videos left after skipping {} of {}",
                    request.skip, available
                ),
            });
        }

        let total = selected.len();
        self.log_port
            .info(&format!(
                "Processing {} videos from {} (skipped {})",
                total, request.channel, request.skip
            ))
            .await;

        for (position, url) in selected.iter().enumerate() {
            self.log_port
                .info(&format!("Video {}/{}: {}", position + 1, total, url))
                .await;

            let video = request.video_request(position, url);
            let result = self.stack.execute(&video).await;

            let entry = match &result {
                Ok(run) => BatchEntry {
                    position,
                    url: url.clone(),
                    final_dir: video.paths.final_dir.clone(),
                    outputs: run.outputs().len(),
                    failed_pairs: run.failed_pairs(),
                    error: None,
                },
                Err(e) => BatchEntry {
                    position,
                    url: url.clone(),
                    final_dir: video.paths.final_dir.clone(),
                    outputs: 0,
                    failed_pairs: 0,
                    error: Some(e.to_string()),
                },
            };
            report.videos.push(entry);

            if let Err(e) = result {
                if !request.template.isolate_failures {
                    return Err(e);
                }
                self.log_port
                    .warn(&format!("Video {} failed: {}; continuing", position + 1, e))
                    .await;
            }
        }

        Ok(())
    }

    async fn write_report(&self, final_dir: &Path, report: &BatchReport) {
        let path = final_dir.join(BATCH_REPORT_FILE);
        let written = match serde_json::to_vec_pretty(report) {
            Ok(bytes) => self.fs_port.write_file(&path, &bytes).await,
            Err(e) => Err(DomainError::FsFail(format!(
                "Failed to serialize batch report: {}",
                e
            ))),
        };
        if let Err(e) = written {
            self.log_port
                .warn(&format!("Could not write batch report: {}", e))
                .await;
        }
    }
}
