//! stackclip library
//!
//! Cuts a primary and a secondary video into matching segments, pairs them and
//! stacks each pair into one composite clip. Downloading is delegated to yt-dlp
//! and all media work to ffmpeg.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{
    MediaDuration, PairingPolicy, SegmentBoundarySet, SegmentList, SegmentMode, Settings,
    StackLayout,
};
pub use domain::rules::{Pairer, SegmentPlanner};
