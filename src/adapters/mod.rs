// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod fetch_ytdlp;
pub mod fs_local;
pub mod probe_ffmpeg;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_ffmpeg::{FFmpegAdapter, ProcessRunner};
pub use fetch_ytdlp::YtDlpAdapter;
pub use fs_local::FsLocalAdapter;
pub use probe_ffmpeg::FFmpegProbeAdapter;
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::TracingLogAdapter;
