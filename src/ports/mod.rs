// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Exit status of an external tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    /// `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl ToolStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Convert a non-zero status into a `ToolFailure` for `operation`
    pub fn check(&self, operation: &str) -> Result<(), DomainError> {
        if self.success() {
            Ok(())
        } else {
            Err(DomainError::ToolFailure {
                operation: operation.to_string(),
                code: self.code,
            })
        }
    }
}

/// Status plus the free-text diagnostics the tool printed
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ToolStatus,
    pub diagnostics: String,
}

/// Port for the external media tool
#[async_trait]
pub trait ToolPort: Send + Sync {
    /// Run to completion and report the exit status
    async fn run(&self, args: &[String]) -> Result<ToolStatus, DomainError>;

    /// Run to completion and also return the diagnostic text
    async fn run_capturing(&self, args: &[String]) -> Result<ToolOutput, DomainError>;
}

/// Port for media duration probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Duration of the media file; zero when the tool reports none
    async fn probe_duration(&self, path: &Path) -> Result<MediaDuration, DomainError>;
}

/// Port for remote video retrieval
#[async_trait]
pub trait FetchPort: Send + Sync {
    /// Download `url` to `destination` using an opaque format selector
    async fn fetch(
        &self,
        url: &str,
        format_selector: &str,
        destination: &Path,
    ) -> Result<PathBuf, DomainError>;

    /// Entry URLs of a playlist, in playlist order
    async fn list_playlist(&self, url: &str) -> Result<Vec<String>, DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Check if file exists
    async fn file_exists(&self, path: &Path) -> Result<bool, DomainError>;

    /// Create directory (including parent directories)
    async fn create_directory(&self, path: &Path) -> Result<(), DomainError>;

    /// Files in `dir` whose names start with `prefix`, sorted by name.
    /// A missing directory yields an empty list.
    async fn list_segments(&self, dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, DomainError>;

    /// Delete file
    async fn delete_file(&self, path: &Path) -> Result<(), DomainError>;

    /// Delete directory recursively
    async fn delete_directory(&self, path: &Path) -> Result<(), DomainError>;

    /// Write a whole file, creating parent directories
    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), DomainError>;
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    /// Log info message
    async fn info(&self, message: &str);

    /// Log warning message
    async fn warn(&self, message: &str);

    /// Log error message
    async fn error(&self, message: &str);

    /// Log debug message
    async fn debug(&self, message: &str);
}
