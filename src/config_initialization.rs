//! Configuration initialization and hierarchy management
//!
//! Precedence: CLI > Env > File > Defaults. Environment variables reach us
//! through clap's `env` attributes, so they arrive as CLI values.

use tracing::{debug, info};

use crate::adapters::TomlConfigAdapter;
use crate::cli::{Cli, Commands, ConvertArgs, SegmentArgs, StackArgs};
use crate::domain::errors::DomainError;
use crate::domain::model::Settings;

/// Load the config file and apply every override the command line carries
pub fn initialize_settings(cli: &Cli) -> Result<Settings, DomainError> {
    info!("Initializing configuration hierarchy");

    let (mut settings, source) = TomlConfigAdapter::new(cli.config.clone()).load()?;
    if source.is_none() {
        debug!("Using built-in defaults");
    }

    apply_global_overrides(&mut settings, cli);
    match &cli.command {
        Commands::Stack(args) => apply_stack_overrides(&mut settings, args),
        Commands::Plan(args) => apply_segment_overrides(&mut settings, &args.segment),
        Commands::Convert(args) => apply_convert_overrides(&mut settings, args),
    }

    if settings.merge.workers == 0 {
        settings.merge.workers = num_cpus::get();
        debug!(workers = settings.merge.workers, "Using one merge worker per CPU");
    }

    settings.validate()?;
    Ok(settings)
}

fn apply_global_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(ffmpeg) = &cli.ffmpeg {
        settings.tool.ffmpeg = ffmpeg.clone();
    }
    if let Some(yt_dlp) = &cli.yt_dlp {
        settings.fetch.binary = yt_dlp.clone();
    }
    if let Some(timeout) = cli.tool_timeout {
        settings.tool.timeout_secs = Some(timeout);
    }
}

fn apply_segment_overrides(settings: &mut Settings, args: &SegmentArgs) {
    if let Some(n) = args.segments {
        settings.segment.mode = "count".to_string();
        settings.segment.count = n;
    }
    if let Some(seconds) = args.segment_length {
        settings.segment.mode = "fixed_length".to_string();
        settings.segment.seconds = seconds;
    }
    if let Some(width) = args.pad_width {
        settings.segment.pad_width = width;
    }
}

fn apply_stack_overrides(settings: &mut Settings, args: &StackArgs) {
    apply_segment_overrides(settings, &args.segment);

    // Either kind of main source on the command line replaces the other from the file
    if let Some(primary) = &args.primary {
        settings.sources.primary = Some(primary.clone());
        settings.sources.channel = None;
    }
    if let Some(channel) = &args.channel {
        settings.sources.channel = Some(channel.clone());
        settings.sources.primary = None;
    }
    if let Some(count) = args.channel_count {
        settings.sources.channel_count = count;
    }
    if let Some(skip) = args.channel_skip {
        settings.sources.channel_skip = skip;
    }
    // A secondary given on the command line replaces either kind from the file
    if let Some(secondary) = &args.secondary {
        settings.sources.secondary = Some(secondary.clone());
        settings.sources.secondary_playlist = None;
    }
    if let Some(playlist) = &args.secondary_playlist {
        settings.sources.secondary_playlist = Some(playlist.clone());
        settings.sources.secondary = None;
    }

    if let Some(policy) = &args.pairing {
        settings.pairing.policy = policy.clone();
    }
    if args.seed.is_some() {
        settings.pairing.seed = args.seed;
    }
    if let Some(layout) = &args.layout {
        settings.layout.orientation = layout.clone();
    }
    if args.width.is_some() {
        settings.layout.width = args.width;
    }
    if args.height.is_some() {
        settings.layout.height = args.height;
    }
    if let Some(crf) = args.crf {
        settings.encode.crf = crf;
    }
    if let Some(preset) = &args.preset {
        settings.encode.preset = preset.clone();
    }
    if let Some(format) = &args.format {
        settings.fetch.format_selector = format.clone();
    }
    if let Some(work_dir) = &args.work_dir {
        settings.paths.work_dir = work_dir.clone();
    }
    if let Some(workers) = args.workers {
        settings.merge.workers = workers;
    }
    if args.isolate_failures {
        settings.merge.isolate_failures = true;
    }
    if args.no_overwrite {
        settings.merge.overwrite = false;
    }
    if args.keep_intermediates {
        settings.cleanup.keep_intermediates = true;
    }
    if args.strict_probe {
        settings.tool.strict_probe = true;
    }
}

fn apply_convert_overrides(settings: &mut Settings, args: &ConvertArgs) {
    if let Some(format) = &args.format {
        settings.fetch.format_selector = format.clone();
    }
    if let Some(crf) = args.crf {
        settings.encode.crf = crf;
    }
    if let Some(preset) = &args.preset {
        settings.encode.preset = preset.clone();
    }
}
