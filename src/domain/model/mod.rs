// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

pub mod settings;

pub use settings::*;

/// Media duration in seconds, as reported by the media tool's diagnostics
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct MediaDuration {
    seconds: f64,
}

impl MediaDuration {
    pub const ZERO: MediaDuration = MediaDuration { seconds: 0.0 };

    /// Create a duration from seconds, rejecting negative or non-finite values
    pub fn from_seconds(seconds: f64) -> Result<Self, DomainError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Duration must be a non-negative number of seconds, got {}",
                seconds
            )));
        }
        Ok(Self { seconds })
    }

    /// Create a duration from `H:MM:SS.frac` components
    pub fn from_components(hours: u32, minutes: u32, seconds: f64) -> Result<Self, DomainError> {
        Self::from_seconds(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0.0
    }
}

impl fmt::Display for MediaDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::utils::time::format_seconds(self.seconds))
    }
}

/// How a source is cut into segments
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentMode {
    /// Split into `n` segments of equal length
    Count { n: u32 },
    /// Split every `seconds`, the last segment holding the remainder
    FixedLength { seconds: f64 },
}

impl SegmentMode {
    /// Validate mode parameters
    pub fn validate(&self) -> Result<(), DomainError> {
        match *self {
            SegmentMode::Count { n } if n == 0 => Err(DomainError::BadArgs(
                "Segment count must be at least 1".to_string(),
            )),
            SegmentMode::FixedLength { seconds } if !(seconds.is_finite() && seconds > 0.0) => {
                Err(DomainError::BadArgs(format!(
                    "Segment length must be a positive number of seconds, got {}",
                    seconds
                )))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentMode::Count { n } => write!(f, "{} equal parts", n),
            SegmentMode::FixedLength { seconds } => write!(f, "{}s parts", seconds),
        }
    }
}

/// Ordered cut points for one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentBoundarySet {
    pub mode: SegmentMode,
    pub duration: MediaDuration,
    /// Offsets in seconds. For count mode these are the interior cuts only; for
    /// fixed-length mode the final entry is the total duration.
    pub boundaries: Vec<f64>,
}

impl SegmentBoundarySet {
    /// Number of segments the media tool is expected to produce
    pub fn segment_count(&self) -> usize {
        match self.mode {
            SegmentMode::Count { n } => n as usize,
            SegmentMode::FixedLength { .. } => self.boundaries.len(),
        }
    }

    /// Length of each segment in temporal order
    pub fn segment_lengths(&self) -> Vec<f64> {
        let mut lengths = Vec::with_capacity(self.segment_count());
        let mut previous = 0.0;
        for &boundary in &self.boundaries {
            lengths.push(boundary - previous);
            previous = boundary;
        }
        if let SegmentMode::Count { .. } = self.mode {
            lengths.push(self.duration.seconds() - previous);
        }
        lengths
    }

    /// Even-split segment length, if this set came from count mode
    pub fn even_segment_length(&self) -> Option<f64> {
        match self.mode {
            SegmentMode::Count { n } => Some(self.duration.seconds() / n as f64),
            SegmentMode::FixedLength { .. } => None,
        }
    }
}

/// File naming scheme for one source's segments: `<label>_<NN>.<ext>`
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentNaming {
    pub label: String,
    pub extension: String,
    pub pad_width: usize,
}

impl SegmentNaming {
    pub fn new(label: impl Into<String>, extension: impl Into<String>, pad_width: usize) -> Self {
        Self {
            label: label.into(),
            extension: extension.into(),
            pad_width,
        }
    }

    /// Prefix shared by every segment of this source
    pub fn prefix(&self) -> String {
        format!("{}_", self.label)
    }

    /// Output pattern handed to the segment muxer
    pub fn pattern(&self) -> String {
        format!("{}_%0{}d.{}", self.label, self.pad_width, self.extension)
    }

    /// File name of the segment with the given ordinal
    pub fn file_name(&self, ordinal: usize) -> String {
        format!(
            "{}_{:0width$}.{}",
            self.label,
            ordinal,
            self.extension,
            width = self.pad_width
        )
    }

    /// Largest segment count for which lexicographic order equals temporal order
    pub fn max_segments(&self) -> usize {
        10usize.saturating_pow(self.pad_width as u32)
    }
}

/// One cut piece of a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentFile {
    pub label: String,
    pub ordinal: usize,
    pub path: PathBuf,
}

/// Ordered segments of one source, in temporal order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentList {
    pub label: String,
    pub files: Vec<SegmentFile>,
}

impl SegmentList {
    /// Build from paths already sorted by the enumerator
    pub fn from_sorted_paths(label: impl Into<String>, paths: Vec<PathBuf>) -> Self {
        let label = label.into();
        let files = paths
            .into_iter()
            .enumerate()
            .map(|(ordinal, path)| SegmentFile {
                label: label.clone(),
                ordinal,
                path,
            })
            .collect();
        Self { label, files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }
}

/// How secondary segments are assigned when the secondary list is shorter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PairingPolicy {
    /// Repeat the secondary list until it covers the primary list
    Cyclic,
    /// Pick a uniformly random secondary segment for each uncovered index
    Random { seed: Option<u64> },
}

impl Default for PairingPolicy {
    fn default() -> Self {
        PairingPolicy::Cyclic
    }
}

impl PairingPolicy {
    /// Parse policy name; the seed only applies to `random`
    pub fn parse(name: &str, seed: Option<u64>) -> Result<Self, DomainError> {
        match name.to_lowercase().as_str() {
            "cyclic" => Ok(PairingPolicy::Cyclic),
            "random" => Ok(PairingPolicy::Random { seed }),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid pairing policy: {}. Valid policies: cyclic, random",
                name
            ))),
        }
    }
}

/// One primary segment with its assigned secondary segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPair {
    pub index: usize,
    pub primary: SegmentFile,
    pub secondary: SegmentFile,
}

pub type PairedSegments = Vec<SegmentPair>;

/// Canvas size each input is scaled to before stacking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::BadArgs("Canvas dimensions cannot be zero".to_string()));
        }
        if width % 2 != 0 || height % 2 != 0 {
            return Err(DomainError::BadArgs(format!(
                "Canvas dimensions must be even for yuv420p output, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }
}

/// Composite arrangement of the two inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackLayout {
    /// Primary on top, secondary below, each scaled to the canvas
    Vertical,
    /// Primary on the left, secondary on the right, each scaled to the canvas
    Horizontal,
    /// Canvas is the whole frame: primary fitted into the top third,
    /// secondary covering the lower two thirds
    Portrait,
}

impl StackLayout {
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        match name.to_lowercase().as_str() {
            "vertical" | "vstack" => Ok(StackLayout::Vertical),
            "horizontal" | "hstack" => Ok(StackLayout::Horizontal),
            "portrait" => Ok(StackLayout::Portrait),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid layout: {}. Valid layouts: vertical, horizontal, portrait",
                name
            ))),
        }
    }

    /// Default canvas for the layout
    pub fn default_canvas(&self) -> Canvas {
        match self {
            StackLayout::Vertical | StackLayout::Horizontal => Canvas {
                width: 1280,
                height: 720,
            },
            StackLayout::Portrait => Canvas {
                width: 1080,
                height: 1920,
            },
        }
    }
}

/// Encoder parameters shared by segmenting and merging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeSettings {
    pub crf: u8,
    pub preset: String,
    pub audio_bitrate: String,
    pub gop: u32,
    pub container: String,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            crf: 23,
            preset: "fast".to_string(),
            audio_bitrate: "128k".to_string(),
            gop: 30,
            container: "mp4".to_string(),
        }
    }
}

impl EncodeSettings {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.crf > 51 {
            return Err(DomainError::BadArgs("CRF value cannot exceed 51".to_string()));
        }
        if self.preset.trim().is_empty() {
            return Err(DomainError::BadArgs("Encoding preset cannot be empty".to_string()));
        }
        if self.gop == 0 {
            return Err(DomainError::BadArgs("GOP size must be at least 1".to_string()));
        }
        if self.container.trim().is_empty() || self.container.contains('.') {
            return Err(DomainError::BadArgs(format!(
                "Invalid container extension: {:?}",
                self.container
            )));
        }
        Ok(())
    }
}

/// Where a source comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSpec {
    /// Fetched by the downloader, deleted during cleanup
    Remote(String),
    /// Existing file used in place, never deleted
    Local(PathBuf),
}

impl SourceSpec {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::BadArgs("Source cannot be empty".to_string()));
        }
        let lower = trimmed.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(SourceSpec::Remote(trimmed.to_string()))
        } else {
            Ok(SourceSpec::Local(PathBuf::from(trimmed)))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SourceSpec::Remote(_))
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Remote(url) => write!(f, "{}", url),
            SourceSpec::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Stage of a stacking run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Idle,
    Fetching,
    Probing,
    Segmenting,
    Pairing,
    Merging,
    CleaningUp,
    Done,
    Failed,
}

impl RunStage {
    /// Next stage on success; terminal stages stay put
    pub fn next(self) -> RunStage {
        match self {
            RunStage::Idle => RunStage::Fetching,
            RunStage::Fetching => RunStage::Probing,
            RunStage::Probing => RunStage::Segmenting,
            RunStage::Segmenting => RunStage::Pairing,
            RunStage::Pairing => RunStage::Merging,
            RunStage::Merging => RunStage::CleaningUp,
            RunStage::CleaningUp => RunStage::Done,
            RunStage::Done => RunStage::Done,
            RunStage::Failed => RunStage::Failed,
        }
    }

    /// Move from `self` to `target`, which must be the successor or `Failed`
    pub fn transition(self, target: RunStage) -> Result<RunStage, DomainError> {
        if self.is_terminal() {
            return Err(DomainError::BadArgs(format!(
                "Run already finished in stage {:?}",
                self
            )));
        }
        if target == RunStage::Failed || target == self.next() {
            Ok(target)
        } else {
            Err(DomainError::BadArgs(format!(
                "Invalid stage transition {:?} -> {:?}",
                self, target
            )))
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStage::Done | RunStage::Failed)
    }
}
