//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;
use clap_num::number_range;

fn crf_in_range(s: &str) -> Result<u8, String> {
    number_range(s, 0, 51)
}

fn pad_width_in_range(s: &str) -> Result<usize, String> {
    number_range(s, 1, 6)
}

/// Segmentation options shared by `stack` and `plan`
#[derive(Args, Debug, Clone, Default)]
pub struct SegmentArgs {
    /// Split into this many equal segments
    #[arg(long, conflicts_with = "segment_length")]
    pub segments: Option<u32>,

    /// Split every N seconds; the last segment holds the remainder
    #[arg(long, value_name = "SECONDS")]
    pub segment_length: Option<f64>,

    /// Zero padding of segment ordinals in file names (1-6)
    #[arg(long, value_parser = pad_width_in_range)]
    pub pad_width: Option<usize>,
}

/// Arguments for the stack command
#[derive(Args, Debug, Clone, Default)]
pub struct StackArgs {
    /// Main video: URL or local file
    #[arg(short, long, conflicts_with = "channel")]
    pub primary: Option<String>,

    /// Channel or playlist URL; each selected video is stacked in turn
    #[arg(long)]
    pub channel: Option<String>,

    /// Number of channel videos to process
    #[arg(long, requires = "channel")]
    pub channel_count: Option<usize>,

    /// Channel videos to skip before processing
    #[arg(long, requires = "channel")]
    pub channel_skip: Option<usize>,

    /// Filler video: URL or local file
    #[arg(short, long, conflicts_with = "secondary_playlist")]
    pub secondary: Option<String>,

    /// Playlist to pick a random filler video from
    #[arg(long)]
    pub secondary_playlist: Option<String>,

    #[command(flatten)]
    pub segment: SegmentArgs,

    /// Pairing policy when the filler has fewer segments (cyclic, random)
    #[arg(long)]
    pub pairing: Option<String>,

    /// Seed for the random pairing policy
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stack layout (vertical, horizontal, portrait)
    #[arg(long)]
    pub layout: Option<String>,

    /// Canvas width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Constant Rate Factor (0-51)
    #[arg(long, value_parser = crf_in_range)]
    pub crf: Option<u8>,

    /// Encoding preset
    #[arg(long)]
    pub preset: Option<String>,

    /// yt-dlp format selector
    #[arg(long)]
    pub format: Option<String>,

    /// Directory for downloads, segments and final parts
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Concurrent merges; 0 uses one per CPU
    #[arg(long)]
    pub workers: Option<usize>,

    /// Keep merging the remaining pairs when one fails
    #[arg(long)]
    pub isolate_failures: bool,

    /// Fail instead of merging when an existing final part is in the way
    #[arg(long)]
    pub no_overwrite: bool,

    /// Leave segments and downloads on disk
    #[arg(long)]
    pub keep_intermediates: bool,

    /// Treat a missing duration in probe output as an error
    #[arg(long)]
    pub strict_probe: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Local media file to probe
    #[arg(short, long, required_unless_present = "duration", conflicts_with = "duration")]
    pub input: Option<PathBuf>,

    /// Duration to plan for (seconds, MM:SS or HH:MM:SS.ms) instead of probing
    #[arg(short, long)]
    pub duration: Option<String>,

    #[command(flatten)]
    pub segment: SegmentArgs,

    /// Segment label used in the listed file names
    #[arg(long, default_value = "video1")]
    pub label: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the convert command
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Video URL or local file
    #[arg(short, long)]
    pub input: String,

    /// Output file path
    #[arg(short, long, default_value = "video_for_phone.mp4")]
    pub output: PathBuf,

    /// yt-dlp format selector
    #[arg(long)]
    pub format: Option<String>,

    /// Constant Rate Factor (0-51)
    #[arg(long, value_parser = crf_in_range)]
    pub crf: Option<u8>,

    /// Encoding preset
    #[arg(long)]
    pub preset: Option<String>,

    /// Keep the raw download next to the output
    #[arg(long)]
    pub keep_download: bool,
}
