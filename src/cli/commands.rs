//! Command implementations

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::app::container::AppContainer;
use crate::app::{
    BatchReport, BatchRequest, ConvertRequest, PlanReport, PlanRequest, PlanSource, RunReport,
    StackRequest,
};
use crate::cli::args::{ConvertArgs, PlanArgs};
use crate::domain::model::{MediaDuration, Settings, SourceSpec};
use crate::utils::{format_duration, time::parse_time};

/// Execute the stack command
pub async fn stack(container: &dyn AppContainer, settings: &Settings) -> Result<()> {
    if settings.sources.channel.is_some() {
        return stack_channel(container, settings).await;
    }

    let request = StackRequest::from_settings(settings).context("Invalid stack request")?;
    info!(primary = %request.primary, mode = %request.mode, "Starting stack run");

    let started = Instant::now();
    let report = container
        .stack_interactor()
        .execute(&request)
        .await
        .map_err(|e| {
            if e.is_external() {
                warn!(
                    work_dir = %request.paths.work_dir.display(),
                    "External tool failed, partial files were left on disk"
                );
            }
            e
        })
        .context("Stack run failed")?;

    print_run_summary(&report, &request.paths.final_dir);
    info!(elapsed = %format_duration(started.elapsed()), "Stack run finished");

    let failed = report.failed_pairs();
    if failed > 0 {
        bail!("{} of {} merges failed", failed, report.pairs.len());
    }
    Ok(())
}

/// Stack every selected video of a channel
async fn stack_channel(container: &dyn AppContainer, settings: &Settings) -> Result<()> {
    let request = BatchRequest::from_settings(settings).context("Invalid channel request")?;
    info!(
        channel = %request.channel,
        count = request.count,
        skip = request.skip,
        "Starting channel batch"
    );

    let started = Instant::now();
    let report = container
        .batch_interactor()
        .execute(&request)
        .await
        .context("Channel batch failed")?;

    print_batch_summary(&report);
    info!(elapsed = %format_duration(started.elapsed()), "Channel batch finished");

    let failed = report.failed_videos();
    if failed > 0 {
        bail!("{} of {} videos failed", failed, report.videos.len());
    }
    Ok(())
}

/// Execute the plan command
pub async fn plan(container: &dyn AppContainer, settings: &Settings, args: &PlanArgs) -> Result<()> {
    let source = match (&args.duration, &args.input) {
        (Some(duration), _) => {
            let seconds = parse_time(duration).context("Invalid --duration")?;
            PlanSource::Duration(MediaDuration::from_seconds(seconds)?)
        }
        (None, Some(input)) => PlanSource::File(input.clone()),
        (None, None) => bail!("Either --input or --duration is required"),
    };

    let request = PlanRequest {
        source,
        mode: settings.segment.segment_mode()?,
        label: args.label.clone(),
        extension: settings.encode.container.clone(),
        pad_width: settings.segment.pad_width,
    };
    let report = container
        .plan_interactor()
        .execute(&request)
        .await
        .context("Failed to plan segmentation")?;

    print_plan(&report, args.json)
}

/// Execute the convert command
pub async fn convert(container: &dyn AppContainer, settings: &Settings, args: &ConvertArgs) -> Result<()> {
    let request = ConvertRequest {
        source: SourceSpec::parse(&args.input)?,
        output: args.output.clone(),
        format_selector: settings.fetch.format_selector.clone(),
        encode: settings.encode.clone(),
        keep_download: args.keep_download,
    };

    let output = container
        .convert_interactor()
        .execute(&request)
        .await
        .context("Conversion failed")?;
    println!("{}", output.display());
    Ok(())
}

fn print_plan(report: &PlanReport, json: bool) -> Result<()> {
    if json {
        let json = serde_json::to_string_pretty(report)
            .context("Failed to serialize plan to JSON")?;
        println!("{}", json);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn print_batch_summary(report: &BatchReport) {
    for video in &report.videos {
        match &video.error {
            None => println!(
                "{}  {} parts ({} failed)  {}",
                video.final_dir.display(),
                video.outputs,
                video.failed_pairs,
                video.url
            ),
            Some(error) => println!("{}  FAILED: {}  {}", video.final_dir.display(), error, video.url),
        }
    }
}

fn print_run_summary(report: &RunReport, final_dir: &Path) {
    println!("Final parts in {}:", final_dir.display());
    for pair in &report.pairs {
        match &pair.error {
            None => println!("  {}", pair.output.display()),
            Some(error) => {
                warn!(index = pair.index, "Merge failed");
                println!("  {} FAILED: {}", pair.output.display(), error);
            }
        }
    }
    if report.pairs.is_empty() {
        println!("  (nothing to merge)");
    }
}
