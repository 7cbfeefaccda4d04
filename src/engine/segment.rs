//! Segment muxer invocation

use std::path::{Path, PathBuf};

use crate::domain::model::*;
use crate::engine::{audio_encode_args, format_offset, format_offsets, push_opt, video_encode_args};

/// One segmenting pass over a single source
#[derive(Debug, Clone)]
pub struct SegmentCommand<'a> {
    pub input: &'a Path,
    pub scratch_dir: &'a Path,
    pub naming: &'a SegmentNaming,
    pub plan: &'a SegmentBoundarySet,
    pub encode: &'a EncodeSettings,
}

impl<'a> SegmentCommand<'a> {
    /// Output pattern inside the scratch directory
    pub fn output_pattern(&self) -> PathBuf {
        self.scratch_dir.join(self.naming.pattern())
    }

    /// Re-encode with keyframes forced on every cut so segments start cleanly
    pub fn build(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string()];
        push_opt(&mut args, "-i", self.input.to_string_lossy());

        video_encode_args(&mut args, self.encode);
        push_opt(&mut args, "-g", self.encode.gop);
        push_opt(&mut args, "-sc_threshold", 0);
        audio_encode_args(&mut args, self.encode);

        match self.plan.even_segment_length() {
            Some(length) => {
                let length = format_offset(length);
                push_opt(
                    &mut args,
                    "-force_key_frames",
                    format!("expr:gte(t,n_forced*{})", length),
                );
                push_opt(&mut args, "-f", "segment");
                push_opt(&mut args, "-segment_time", length);
            }
            None => {
                let times = format_offsets(&self.plan.boundaries);
                push_opt(&mut args, "-force_key_frames", &times);
                push_opt(&mut args, "-f", "segment");
                push_opt(&mut args, "-segment_times", times);
            }
        }

        push_opt(&mut args, "-reset_timestamps", 1);
        args.push(self.output_pattern().to_string_lossy().to_string());
        args
    }
}
