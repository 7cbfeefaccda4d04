// Run settings - Typed configuration for a stacking run

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::model::{Canvas, EncodeSettings, PairingPolicy, SegmentMode, StackLayout};

/// Default yt-dlp selector: best mp4 video+audio up to 720p30, merged to mp4
pub const DEFAULT_FORMAT_SELECTOR: &str =
    "bestvideo[ext=mp4][height<=720][fps<=30]+bestaudio[ext=m4a]/best[ext=mp4][height<=720]";

/// Complete settings for all subcommands
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sources: SourceSettings,
    pub fetch: FetchSettings,
    pub tool: ToolSettings,
    pub segment: SegmentSettings,
    pub pairing: PairingSettings,
    pub layout: LayoutSettings,
    pub encode: EncodeSettings,
    pub paths: PathSettings,
    pub merge: MergeSettings,
    pub cleanup: CleanupSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Main video: URL or local path
    pub primary: Option<String>,
    /// Channel or playlist whose videos are each used as the main video
    pub channel: Option<String>,
    /// Videos taken from the channel
    pub channel_count: usize,
    /// Channel entries skipped before taking any
    pub channel_skip: usize,
    /// Filler video: URL or local path
    pub secondary: Option<String>,
    /// Playlist to draw a random secondary video from
    pub secondary_playlist: Option<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            primary: None,
            channel: None,
            channel_count: 1,
            channel_skip: 0,
            secondary: None,
            secondary_playlist: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub binary: String,
    pub format_selector: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            format_selector: DEFAULT_FORMAT_SELECTOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub ffmpeg: String,
    /// Per-invocation limit; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
    /// Treat a missing duration line as an error instead of zero
    pub strict_probe: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            timeout_secs: None,
            strict_probe: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentSettings {
    /// `count` or `fixed_length`
    pub mode: String,
    pub count: u32,
    pub seconds: f64,
    /// Zero padding of segment ordinals in file names
    pub pad_width: usize,
}

impl Default for SegmentSettings {
    fn default() -> Self {
        Self {
            mode: "count".to_string(),
            count: 5,
            seconds: 60.0,
            pad_width: 2,
        }
    }
}

impl SegmentSettings {
    pub fn segment_mode(&self) -> Result<SegmentMode, DomainError> {
        let mode = match self.mode.to_lowercase().replace('-', "_").as_str() {
            "count" => SegmentMode::Count { n: self.count },
            "fixed_length" | "fixed" => SegmentMode::FixedLength {
                seconds: self.seconds,
            },
            other => {
                return Err(DomainError::ConfigError(format!(
                    "Invalid segment mode: {}. Valid modes: count, fixed_length",
                    other
                )))
            }
        };
        mode.validate()?;
        Ok(mode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingSettings {
    /// `cyclic` or `random`
    pub policy: String,
    pub seed: Option<u64>,
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            policy: "cyclic".to_string(),
            seed: None,
        }
    }
}

impl PairingSettings {
    pub fn pairing_policy(&self) -> Result<PairingPolicy, DomainError> {
        PairingPolicy::parse(&self.policy, self.seed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// `vertical`, `horizontal` or `portrait`
    pub orientation: String,
    /// Canvas width; falls back to the layout default
    pub width: Option<u32>,
    /// Canvas height; falls back to the layout default
    pub height: Option<u32>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            orientation: "vertical".to_string(),
            width: None,
            height: None,
        }
    }
}

impl LayoutSettings {
    pub fn stack_layout(&self) -> Result<StackLayout, DomainError> {
        StackLayout::parse(&self.orientation)
    }

    pub fn canvas(&self) -> Result<Canvas, DomainError> {
        let defaults = self.stack_layout()?.default_canvas();
        Canvas::new(
            self.width.unwrap_or(defaults.width),
            self.height.unwrap_or(defaults.height),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Where downloads land
    pub work_dir: PathBuf,
    /// Segment files, removed after a successful run
    pub scratch_dir: PathBuf,
    /// Final composites, kept
    pub final_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            scratch_dir: PathBuf::from("output_parts"),
            final_dir: PathBuf::from("final_output"),
        }
    }
}

impl PathSettings {
    /// Resolve relative scratch/final directories against the work dir
    pub fn resolved(&self) -> PathSettings {
        let resolve = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                self.work_dir.join(p)
            }
        };
        PathSettings {
            work_dir: self.work_dir.clone(),
            scratch_dir: resolve(&self.scratch_dir),
            final_dir: resolve(&self.final_dir),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Concurrent merge invocations
    pub workers: usize,
    /// Keep merging remaining pairs after one fails
    pub isolate_failures: bool,
    /// Overwrite existing final parts
    pub overwrite: bool,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            workers: 1,
            isolate_failures: false,
            overwrite: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    /// Leave segments and downloads on disk after a successful run
    pub keep_intermediates: bool,
}

impl Settings {
    /// Validate every section that does not depend on the subcommand
    pub fn validate(&self) -> Result<(), DomainError> {
        self.encode.validate()?;
        self.segment.segment_mode()?;
        self.pairing.pairing_policy()?;
        self.layout.canvas()?;

        if !(1..=6).contains(&self.segment.pad_width) {
            return Err(DomainError::ConfigError(format!(
                "Segment pad width must be between 1 and 6, got {}",
                self.segment.pad_width
            )));
        }
        if self.merge.workers == 0 {
            return Err(DomainError::ConfigError(
                "Merge workers must be at least 1".to_string(),
            ));
        }
        if self.tool.timeout_secs == Some(0) {
            return Err(DomainError::ConfigError(
                "Tool timeout must be at least 1 second".to_string(),
            ));
        }
        if self.tool.ffmpeg.trim().is_empty() || self.fetch.binary.trim().is_empty() {
            return Err(DomainError::ConfigError(
                "Tool binary paths cannot be empty".to_string(),
            ));
        }
        if self.sources.primary.is_some() && self.sources.channel.is_some() {
            return Err(DomainError::ConfigError(
                "Specify either a primary source or a channel, not both".to_string(),
            ));
        }
        if self.sources.channel_count == 0 {
            return Err(DomainError::ConfigError(
                "Channel video count must be at least 1".to_string(),
            ));
        }
        if self.sources.secondary.is_some() && self.sources.secondary_playlist.is_some() {
            return Err(DomainError::ConfigError(
                "Specify either a secondary source or a secondary playlist, not both".to_string(),
            ));
        }
        Ok(())
    }
}
