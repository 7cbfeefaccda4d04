//! Stack merge invocation

use std::path::Path;

use crate::domain::model::*;
use crate::engine::{audio_encode_args, push_opt, video_encode_args};

/// Filter graph that scales both inputs and stacks them into `[out]`
pub fn filter_graph(layout: StackLayout, canvas: Canvas) -> String {
    let (w, h) = (canvas.width, canvas.height);
    match layout {
        StackLayout::Vertical => format!(
            "[0:v]scale={w}:{h}[top];[1:v]scale={w}:{h}[bottom];[top][bottom]vstack=inputs=2[out]"
        ),
        StackLayout::Horizontal => format!(
            "[0:v]scale={w}:{h}[left];[1:v]scale={w}:{h}[right];[left][right]hstack=inputs=2[out]"
        ),
        StackLayout::Portrait => {
            let (top, bottom) = portrait_split(h);
            format!(
                "[0:v]scale={w}:{top}:force_original_aspect_ratio=decrease:force_divisible_by=2,\
                 pad={w}:{top}:(ow-iw)/2:(oh-ih)/2[top];\
                 [1:v]scale={w}:{bottom}:force_original_aspect_ratio=increase,\
                 crop={w}:{bottom}[bottom];\
                 [top][bottom]vstack=inputs=2[out]"
            )
        }
    }
}

/// Heights of the top third and the remainder, both even
fn portrait_split(height: u32) -> (u32, u32) {
    let top = (height / 3) & !1;
    (top, height - top)
}

/// Merge of one segment pair into a final part
#[derive(Debug, Clone)]
pub struct MergeCommand<'a> {
    pub primary: &'a Path,
    pub secondary: &'a Path,
    pub output: &'a Path,
    pub layout: StackLayout,
    pub canvas: Canvas,
    pub encode: &'a EncodeSettings,
    pub overwrite: bool,
}

impl<'a> MergeCommand<'a> {
    /// Composite video plus the primary's audio, if it has any
    pub fn build(&self) -> Vec<String> {
        let mut args = vec![if self.overwrite { "-y" } else { "-n" }.to_string()];
        push_opt(&mut args, "-i", self.primary.to_string_lossy());
        push_opt(&mut args, "-i", self.secondary.to_string_lossy());
        push_opt(&mut args, "-filter_complex", filter_graph(self.layout, self.canvas));
        push_opt(&mut args, "-map", "[out]");
        push_opt(&mut args, "-map", "0:a?");
        video_encode_args(&mut args, self.encode);
        audio_encode_args(&mut args, self.encode);
        args.push(self.output.to_string_lossy().to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_graph() {
        let graph = filter_graph(StackLayout::Vertical, Canvas::new(1280, 720).unwrap());
        assert_eq!(
            graph,
            "[0:v]scale=1280:720[top];[1:v]scale=1280:720[bottom];[top][bottom]vstack=inputs=2[out]"
        );
    }

    #[test]
    fn test_horizontal_graph() {
        let graph = filter_graph(StackLayout::Horizontal, Canvas::new(640, 360).unwrap());
        assert!(graph.contains("[left][right]hstack=inputs=2[out]"));
        assert!(graph.starts_with("[0:v]scale=640:360[left]"));
    }

    #[test]
    fn test_portrait_graph_splits_canvas() {
        let graph = filter_graph(StackLayout::Portrait, Canvas::new(1080, 1920).unwrap());
        assert!(graph.contains("pad=1080:640:(ow-iw)/2:(oh-ih)/2[top]"));
        assert!(graph.contains("crop=1080:1280[bottom]"));
        assert!(graph.ends_with("[top][bottom]vstack=inputs=2[out]"));
    }

    #[test]
    fn test_portrait_split_stays_even() {
        assert_eq!(portrait_split(1920), (640, 1280));
        assert_eq!(portrait_split(1000), (332, 668));
    }

    #[test]
    fn test_merge_args() {
        let encode = EncodeSettings::default();
        let command = MergeCommand {
            primary: Path::new("parts/video1_00.mp4"),
            secondary: Path::new("parts/video2_00.mp4"),
            output: Path::new("final/final_part1.mp4"),
            layout: StackLayout::Vertical,
            canvas: StackLayout::Vertical.default_canvas(),
            encode: &encode,
            overwrite: false,
        };
        let args = command.build();
        assert_eq!(args[0], "-n");
        assert_eq!(&args[1..5], ["-i", "parts/video1_00.mp4", "-i", "parts/video2_00.mp4"]);
        assert_eq!(&args[7..11], ["-map", "[out]", "-map", "0:a?"]);
        assert_eq!(args.last().unwrap(), "final/final_part1.mp4");
    }
}
