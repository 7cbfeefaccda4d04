//! Media tool argument builders
//!
//! Every external invocation is a fixed argument vector assembled here from
//! typed inputs. Nothing in this module spawns processes; the application
//! layer hands the vectors to a `ToolPort`.

use crate::domain::model::EncodeSettings;

pub mod convert;
pub mod merge;
pub mod segment;

pub use convert::ConvertCommand;
pub use merge::MergeCommand;
pub use segment::SegmentCommand;

/// Push a flag followed by its value
pub(crate) fn push_opt(args: &mut Vec<String>, flag: &str, value: impl ToString) {
    args.push(flag.to_string());
    args.push(value.to_string());
}

/// libx264 video encoding at the configured quality
pub(crate) fn video_encode_args(args: &mut Vec<String>, encode: &EncodeSettings) {
    push_opt(args, "-c:v", "libx264");
    push_opt(args, "-crf", encode.crf);
    push_opt(args, "-preset", &encode.preset);
}

/// AAC audio at the configured bitrate
pub(crate) fn audio_encode_args(args: &mut Vec<String>, encode: &EncodeSettings) {
    push_opt(args, "-c:a", "aac");
    push_opt(args, "-b:a", &encode.audio_bitrate);
}

/// Format seconds for the segment muxer, rounded to whole milliseconds
pub(crate) fn format_offset(seconds: f64) -> String {
    let millis = (seconds * 1000.0).round() / 1000.0;
    millis.to_string()
}

/// Comma-separated offsets for `-segment_times` and `-force_key_frames`
pub(crate) fn format_offsets(offsets: &[f64]) -> String {
    offsets
        .iter()
        .map(|&o| format_offset(o))
        .collect::<Vec<_>>()
        .join(",")
}
