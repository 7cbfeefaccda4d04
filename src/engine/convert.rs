//! Phone-friendly mp4 transcode

use std::path::Path;

use crate::domain::model::EncodeSettings;
use crate::engine::{audio_encode_args, push_opt, video_encode_args};

/// Transcode to H.264 baseline 3.1 / yuv420p with the index up front, which
/// plays inline on phones and messenger clients
#[derive(Debug, Clone)]
pub struct ConvertCommand<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub encode: &'a EncodeSettings,
}

impl<'a> ConvertCommand<'a> {
    pub fn build(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string()];
        push_opt(&mut args, "-i", self.input.to_string_lossy());
        video_encode_args(&mut args, self.encode);
        push_opt(&mut args, "-profile:v", "baseline");
        push_opt(&mut args, "-level", "3.1");
        push_opt(&mut args, "-pix_fmt", "yuv420p");
        audio_encode_args(&mut args, self.encode);
        push_opt(&mut args, "-movflags", "+faststart");
        args.push(self.output.to_string_lossy().to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_args() {
        let encode = EncodeSettings::default();
        let args = ConvertCommand {
            input: Path::new("raw.mp4"),
            output: Path::new("clip.mp4"),
            encode: &encode,
        }
        .build();

        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "raw.mp4",
                "-c:v",
                "libx264",
                "-crf",
                "23",
                "-preset",
                "fast",
                "-profile:v",
                "baseline",
                "-level",
                "3.1",
                "-pix_fmt",
                "yuv420p",
                "-c:a",
                "aac",
                "-b:a",
                "128k",
                "-movflags",
                "+faststart",
                "clip.mp4",
            ]
        );
    }
}
