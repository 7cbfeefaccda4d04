//! CLI module for stackclip
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{ConvertArgs, PlanArgs, SegmentArgs, StackArgs};

/// stackclip
///
/// Downloads two videos, cuts them into matching segments and stacks every
/// pair into one composite clip with ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "stackclip")]
#[command(about = "Cut two videos into segments and stack them pair by pair")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", global = true, env = "STACKCLIP_LOG_LEVEL")]
    pub log_level: String,

    /// Log output format (pretty, compact, json)
    #[arg(long, default_value = "pretty", global = true)]
    pub log_format: String,

    /// TOML config file (default: ./stackclip.toml if present)
    #[arg(long, global = true, env = "STACKCLIP_CONFIG")]
    pub config: Option<PathBuf>,

    /// ffmpeg binary
    #[arg(long, global = true, env = "STACKCLIP_FFMPEG")]
    pub ffmpeg: Option<String>,

    /// yt-dlp binary
    #[arg(long = "yt-dlp", global = true, env = "STACKCLIP_YTDLP")]
    pub yt_dlp: Option<String>,

    /// Per-invocation limit for external tools, in seconds
    #[arg(long, global = true, env = "STACKCLIP_TOOL_TIMEOUT")]
    pub tool_timeout: Option<u64>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, segment, pair and stack two videos
    Stack(StackArgs),
    /// Print the segmentation plan for a file or duration
    Plan(PlanArgs),
    /// Convert one video to a phone-friendly mp4
    Convert(ConvertArgs),
}
