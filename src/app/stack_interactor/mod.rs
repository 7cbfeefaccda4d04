// Stack interactor - Orchestrates the fetch, segment, pair and merge run

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{MergeCommand, SegmentCommand};
use crate::ports::*;

/// Label of the main video's segments and download
pub const PRIMARY_LABEL: &str = "video1";
/// Label of the filler video's segments and download
pub const SECONDARY_LABEL: &str = "video2";
/// Report file written next to the final parts
pub const REPORT_FILE: &str = "run_report.json";

/// Where the secondary video comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SecondarySource {
    Source(SourceSpec),
    /// One entry is picked at random
    Playlist(String),
}

/// Fully resolved inputs of a stacking run
#[derive(Debug, Clone)]
pub struct StackRequest {
    pub primary: SourceSpec,
    pub secondary: SecondarySource,
    pub mode: SegmentMode,
    pub pairing: PairingPolicy,
    /// Seeds every random choice of the run
    pub seed: Option<u64>,
    pub layout: StackLayout,
    pub canvas: Canvas,
    pub encode: EncodeSettings,
    pub format_selector: String,
    pub paths: PathSettings,
    pub pad_width: usize,
    pub workers: usize,
    pub isolate_failures: bool,
    pub overwrite: bool,
    pub keep_intermediates: bool,
}

impl StackRequest {
    /// Build a request from merged settings
    pub fn from_settings(settings: &Settings) -> Result<Self, DomainError> {
        let primary = settings
            .sources
            .primary
            .as_deref()
            .ok_or_else(|| DomainError::BadArgs("A primary source is required".to_string()))?;
        Self::with_primary(settings, SourceSpec::parse(primary)?)
    }

    /// Build a request for an explicit main source, ignoring `sources.primary`
    pub fn with_primary(settings: &Settings, primary: SourceSpec) -> Result<Self, DomainError> {
        settings.validate()?;

        let secondary = match (
            &settings.sources.secondary,
            &settings.sources.secondary_playlist,
        ) {
            (Some(source), None) => SecondarySource::Source(SourceSpec::parse(source)?),
            (None, Some(playlist)) => SecondarySource::Playlist(playlist.clone()),
            (None, None) => {
                return Err(DomainError::BadArgs(
                    "A secondary source or secondary playlist is required".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(DomainError::ConfigError(
                    "Specify either a secondary source or a secondary playlist, not both"
                        .to_string(),
                ))
            }
        };

        Ok(Self {
            primary,
            secondary,
            mode: settings.segment.segment_mode()?,
            pairing: settings.pairing.pairing_policy()?,
            seed: settings.pairing.seed,
            layout: settings.layout.stack_layout()?,
            canvas: settings.layout.canvas()?,
            encode: settings.encode.clone(),
            format_selector: settings.fetch.format_selector.clone(),
            paths: settings.paths.resolved(),
            pad_width: settings.segment.pad_width,
            workers: settings.merge.workers,
            isolate_failures: settings.merge.isolate_failures,
            overwrite: settings.merge.overwrite,
            keep_intermediates: settings.cleanup.keep_intermediates,
        })
    }
}

/// Outcome of merging one pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairRecord {
    pub index: usize,
    pub primary: PathBuf,
    pub secondary: PathBuf,
    pub output: PathBuf,
    pub elapsed_ms: u64,
    pub error: Option<String>,
}

impl PairRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a run, persisted as JSON in the final directory
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub stage: RunStage,
    /// Stage the run was in when it failed
    pub failed_stage: Option<RunStage>,
    pub primary: String,
    pub secondary: Option<String>,
    pub mode: SegmentMode,
    pub pairing: PairingPolicy,
    pub layout: StackLayout,
    pub canvas: Canvas,
    pub primary_plan: Option<SegmentBoundarySet>,
    pub secondary_plan: Option<SegmentBoundarySet>,
    pub pairs: Vec<PairRecord>,
    pub error: Option<String>,
}

impl RunReport {
    fn new(request: &StackRequest) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            stage: RunStage::Idle,
            failed_stage: None,
            primary: request.primary.to_string(),
            secondary: match &request.secondary {
                SecondarySource::Source(spec) => Some(spec.to_string()),
                SecondarySource::Playlist(_) => None,
            },
            mode: request.mode,
            pairing: request.pairing,
            layout: request.layout,
            canvas: request.canvas,
            primary_plan: None,
            secondary_plan: None,
            pairs: Vec::new(),
            error: None,
        }
    }

    /// Final parts that were written successfully, by ordinal
    pub fn outputs(&self) -> Vec<&Path> {
        self.pairs
            .iter()
            .filter(|p| p.succeeded())
            .map(|p| p.output.as_path())
            .collect()
    }

    pub fn failed_pairs(&self) -> usize {
        self.pairs.iter().filter(|p| !p.succeeded()).count()
    }
}

/// Files created by the run that cleanup may remove
#[derive(Debug, Default)]
struct Artifacts {
    downloads: Vec<PathBuf>,
    segments: Vec<PathBuf>,
}

/// One merge invocation, prepared before any task is spawned
struct MergeJob {
    index: usize,
    primary: PathBuf,
    secondary: PathBuf,
    output: PathBuf,
    args: Vec<String>,
}

type MergeOutcome = (PairRecord, Result<(), DomainError>, OwnedSemaphorePermit);

/// Interactor for the stacking use case
pub struct StackInteractor {
    fetch_port: Arc<dyn FetchPort>,
    probe_port: Arc<dyn ProbePort>,
    tool_port: Arc<dyn ToolPort>,
    fs_port: Arc<dyn FsPort>,
    log_port: Arc<dyn LogPort>,
}

impl StackInteractor {
    /// Create new stack interactor with injected ports
    pub fn new(
        fetch_port: Arc<dyn FetchPort>,
        probe_port: Arc<dyn ProbePort>,
        tool_port: Arc<dyn ToolPort>,
        fs_port: Arc<dyn FsPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            fetch_port,
            probe_port,
            tool_port,
            fs_port,
            log_port,
        }
    }

    /// Run every stage. Aborting failures are returned as errors; with
    /// isolated merges the report carries the failed pairs instead. The report
    /// is written in both cases.
    pub async fn execute(&self, request: &StackRequest) -> Result<RunReport, DomainError> {
        let mut report = RunReport::new(request);
        let mut artifacts = Artifacts::default();

        let outcome = self.run(request, &mut report, &mut artifacts).await;

        report.finished_at = Some(Utc::now());
        report.pairs.sort_by_key(|p| p.index);
        if let Err(e) = &outcome {
            self.log_port
                .error(&format!("Run failed during {:?}: {}", report.stage, e))
                .await;
            report.failed_stage = Some(report.stage);
            report.stage = RunStage::Failed;
            report.error = Some(e.to_string());
        }

        self.write_report(&request.paths.final_dir, &report).await;
        outcome.map(|()| report)
    }

    async fn run(
        &self,
        request: &StackRequest,
        report: &mut RunReport,
        artifacts: &mut Artifacts,
    ) -> Result<(), DomainError> {
        let paths = &request.paths;

        self.advance(report, RunStage::Fetching).await?;
        for dir in [&paths.work_dir, &paths.scratch_dir, &paths.final_dir] {
            self.fs_port.create_directory(dir).await?;
        }
        let primary_path = self
            .resolve_source(&request.primary, PRIMARY_LABEL, request, artifacts)
            .await?;
        let secondary_spec = match &request.secondary {
            SecondarySource::Source(spec) => spec.clone(),
            SecondarySource::Playlist(url) => self.pick_from_playlist(url, request.seed).await?,
        };
        report.secondary = Some(secondary_spec.to_string());
        let secondary_path = self
            .resolve_source(&secondary_spec, SECONDARY_LABEL, request, artifacts)
            .await?;

        self.advance(report, RunStage::Probing).await?;
        let primary_duration = self.probe_port.probe_duration(&primary_path).await?;
        // Count mode cuts both sources into the primary's segment length
        let secondary_duration = match request.mode {
            SegmentMode::Count { .. } => primary_duration,
            SegmentMode::FixedLength { .. } => {
                self.probe_port.probe_duration(&secondary_path).await?
            }
        };
        self.log_port
            .info(&format!(
                "Durations: {} = {}, {} = {}",
                PRIMARY_LABEL, primary_duration, SECONDARY_LABEL, secondary_duration
            ))
            .await;

        self.advance(report, RunStage::Segmenting).await?;
        report.primary_plan = Some(
            self.segment_source(&primary_path, PRIMARY_LABEL, primary_duration, request)
                .await?,
        );
        report.secondary_plan = Some(
            self.segment_source(&secondary_path, SECONDARY_LABEL, secondary_duration, request)
                .await?,
        );

        self.advance(report, RunStage::Pairing).await?;
        let primary_list = self.list_segments(PRIMARY_LABEL, request).await?;
        let secondary_list = self.list_segments(SECONDARY_LABEL, request).await?;
        artifacts.segments.extend(primary_list.paths().map(Path::to_path_buf));
        artifacts.segments.extend(secondary_list.paths().map(Path::to_path_buf));
        self.log_port
            .info(&format!(
                "{} has {} parts, {} has {} parts",
                PRIMARY_LABEL,
                primary_list.len(),
                SECONDARY_LABEL,
                secondary_list.len()
            ))
            .await;

        let pairs = if primary_list.is_empty() {
            self.log_port
                .warn("Primary source produced no segments, nothing to merge")
                .await;
            Vec::new()
        } else {
            Pairer::pair(&primary_list, &secondary_list, request.pairing)?
        };

        self.advance(report, RunStage::Merging).await?;
        let jobs = pairs
            .iter()
            .map(|pair| self.merge_job(pair, request))
            .collect();
        self.merge_pairs(jobs, request, &mut report.pairs).await?;

        self.advance(report, RunStage::CleaningUp).await?;
        let failed = report.failed_pairs();
        if request.keep_intermediates {
            self.log_port.info("Keeping intermediate files").await;
        } else if failed > 0 {
            self.log_port
                .warn(&format!(
                    "{} merges failed, keeping intermediate files for inspection",
                    failed
                ))
                .await;
        } else {
            self.clean_up(artifacts, &paths.scratch_dir).await;
        }

        self.advance(report, RunStage::Done).await?;
        self.log_port
            .info(&format!(
                "Finished: {} parts in {}",
                report.outputs().len(),
                paths.final_dir.display()
            ))
            .await;
        Ok(())
    }

    async fn advance(&self, report: &mut RunReport, target: RunStage) -> Result<(), DomainError> {
        report.stage = report.stage.transition(target)?;
        self.log_port.debug(&format!("Stage: {:?}", target)).await;
        Ok(())
    }

    /// Local path of a source, downloading remote ones into the work dir
    async fn resolve_source(
        &self,
        spec: &SourceSpec,
        label: &str,
        request: &StackRequest,
        artifacts: &mut Artifacts,
    ) -> Result<PathBuf, DomainError> {
        match spec {
            SourceSpec::Remote(url) => {
                let destination = request.paths.work_dir.join(format!("{}.mp4", label));
                self.log_port
                    .info(&format!("Fetching {} from {}", label, url))
                    .await;
                let path = self
                    .fetch_port
                    .fetch(url, &request.format_selector, &destination)
                    .await?;
                artifacts.downloads.push(path.clone());
                Ok(path)
            }
            SourceSpec::Local(path) => {
                if !self.fs_port.file_exists(path).await? {
                    return Err(DomainError::FsFail(format!(
                        "Source file does not exist: {}",
                        path.display()
                    )));
                }
                Ok(path.clone())
            }
        }
    }

    async fn pick_from_playlist(
        &self,
        url: &str,
        seed: Option<u64>,
    ) -> Result<SourceSpec, DomainError> {
        let entries = self.fetch_port.list_playlist(url).await?;
        let choice = pick_entry(&entries, seed)
            .cloned()
            .ok_or_else(|| DomainError::FetchFailure {
                url: url.to_string(),
                reason: "playlist has no entries".to_string(),
            })?;
        self.log_port
            .info(&format!(
                "Picked {} of {} playlist entries",
                choice,
                entries.len()
            ))
            .await;
        Ok(SourceSpec::Remote(choice))
    }

    /// Plan and cut one source into the scratch directory
    async fn segment_source(
        &self,
        input: &Path,
        label: &str,
        duration: MediaDuration,
        request: &StackRequest,
    ) -> Result<SegmentBoundarySet, DomainError> {
        let naming = SegmentNaming::new(label, &request.encode.container, request.pad_width);
        let plan = SegmentPlanner::plan_boundaries(duration, request.mode)?;
        SegmentPlanner::check_capacity(&plan, &naming)?;
        self.remove_stale_segments(&request.paths.scratch_dir, &naming).await?;

        self.log_port
            .info(&format!(
                "Splitting {} into {} ({} segments)",
                label,
                request.mode,
                plan.segment_count()
            ))
            .await;

        let args = SegmentCommand {
            input,
            scratch_dir: &request.paths.scratch_dir,
            naming: &naming,
            plan: &plan,
            encode: &request.encode,
        }
        .build();
        self.tool_port
            .run(&args)
            .await?
            .check(&format!("segment {}", label))?;

        Ok(plan)
    }

    /// List one source's segments and verify name order is time order
    async fn list_segments(
        &self,
        label: &str,
        request: &StackRequest,
    ) -> Result<SegmentList, DomainError> {
        let naming = SegmentNaming::new(label, &request.encode.container, request.pad_width);
        let paths = self
            .fs_port
            .list_segments(&request.paths.scratch_dir, &naming.prefix())
            .await?;
        let list = SegmentList::from_sorted_paths(label, paths);
        SegmentPlanner::check_listing(&list, &naming)?;
        Ok(list)
    }

    /// Remove segments of `label` left behind by an earlier run
    async fn remove_stale_segments(
        &self,
        scratch: &Path,
        naming: &SegmentNaming,
    ) -> Result<(), DomainError> {
        let stale = self.fs_port.list_segments(scratch, &naming.prefix()).await?;
        if stale.is_empty() {
            return Ok(());
        }
        self.log_port
            .warn(&format!(
                "Removing {} leftover {} segments from {}",
                stale.len(),
                naming.label,
                scratch.display()
            ))
            .await;
        for path in &stale {
            self.fs_port.delete_file(path).await?;
        }
        Ok(())
    }

    fn merge_job(&self, pair: &SegmentPair, request: &StackRequest) -> MergeJob {
        let output = request.paths.final_dir.join(format!(
            "final_part{}.{}",
            pair.index, request.encode.container
        ));
        let args = MergeCommand {
            primary: &pair.primary.path,
            secondary: &pair.secondary.path,
            output: &output,
            layout: request.layout,
            canvas: request.canvas,
            encode: &request.encode,
            overwrite: request.overwrite,
        }
        .build();

        MergeJob {
            index: pair.index,
            primary: pair.primary.path.clone(),
            secondary: pair.secondary.path.clone(),
            output,
            args,
        }
    }

    /// Run merges on at most `workers` concurrent invocations, starting them
    /// in ordinal order. A task hands its permit back with its result, so a
    /// failure is always observed before the next merge may start.
    async fn merge_pairs(
        &self,
        jobs: Vec<MergeJob>,
        request: &StackRequest,
        records: &mut Vec<PairRecord>,
    ) -> Result<(), DomainError> {
        let total = jobs.len();
        let semaphore = Arc::new(Semaphore::new(request.workers.max(1)));
        let mut tasks: JoinSet<MergeOutcome> = JoinSet::new();
        let mut pending = jobs.into_iter();
        let mut next = pending.next();

        loop {
            tokio::select! {
                biased;

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    let (record, result, _permit) = joined.map_err(|e| DomainError::ToolFailure {
                        operation: format!("merge task ({})", e),
                        code: None,
                    })?;
                    records.push(record);
                    if let Err(e) = result {
                        if !request.isolate_failures {
                            tasks.abort_all();
                            return Err(e);
                        }
                        self.log_port
                            .warn(&format!("{}; continuing with remaining pairs", e))
                            .await;
                    }
                }

                permit = Arc::clone(&semaphore).acquire_owned(), if next.is_some() => {
                    let permit = permit.map_err(|e| DomainError::ToolFailure {
                        operation: format!("merge scheduling ({})", e),
                        code: None,
                    })?;
                    if let Some(job) = next.take() {
                        self.log_port
                            .info(&format!("Merging part {}/{}", job.index + 1, total))
                            .await;
                        tasks.spawn(Self::merge_one(Arc::clone(&self.tool_port), job, permit));
                        next = pending.next();
                    }
                }

                else => break,
            }
        }

        Ok(())
    }

    async fn merge_one(
        tool: Arc<dyn ToolPort>,
        job: MergeJob,
        permit: OwnedSemaphorePermit,
    ) -> MergeOutcome {
        let started = Instant::now();
        let operation = format!("merge part {}", job.index);
        let result = match tool.run(&job.args).await {
            Ok(status) => status.check(&operation),
            Err(e) => Err(e),
        };

        let record = PairRecord {
            index: job.index,
            primary: job.primary,
            secondary: job.secondary,
            output: job.output,
            elapsed_ms: started.elapsed().as_millis() as u64,
            error: result.as_ref().err().map(|e| e.to_string()),
        };
        (record, result, permit)
    }

    /// Best-effort removal of segments and downloads
    async fn clean_up(&self, artifacts: &Artifacts, scratch: &Path) {
        self.log_port.info("Cleaning up temporary files").await;

        for path in artifacts.segments.iter().chain(artifacts.downloads.iter()) {
            if let Err(e) = self.fs_port.delete_file(path).await {
                self.log_port.warn(&format!("Cleanup failed: {}", e)).await;
            }
        }

        match self.fs_port.list_segments(scratch, "").await {
            Ok(rest) if rest.is_empty() => {
                if let Err(e) = self.fs_port.delete_directory(scratch).await {
                    self.log_port.warn(&format!("Cleanup failed: {}", e)).await;
                }
            }
            Ok(rest) => {
                self.log_port
                    .debug(&format!(
                        "Leaving {} with {} unrelated files",
                        scratch.display(),
                        rest.len()
                    ))
                    .await;
            }
            Err(e) => self.log_port.warn(&format!("Cleanup failed: {}", e)).await,
        }
    }

    async fn write_report(&self, final_dir: &Path, report: &RunReport) {
        let path = final_dir.join(REPORT_FILE);
        let written = match serde_json::to_vec_pretty(report) {
            Ok(bytes) => self.fs_port.write_file(&path, &bytes).await,
            Err(e) => Err(DomainError::FsFail(format!("Failed to serialize report: {}", e))),
        };
        match written {
            Ok(()) => {
                self.log_port
                    .debug(&format!("Wrote run report to {}", path.display()))
                    .await
            }
            Err(e) => {
                self.log_port
                    .warn(&format!("Could not write run report: {}", e))
                    .await
            }
        }
    }
}

/// Uniform pick from playlist entries, reproducible when seeded
pub fn pick_entry(entries: &[String], seed: Option<u64>) -> Option<&String> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    entries.choose(&mut rng)
}

#[cfg(test)]
mod tests;
