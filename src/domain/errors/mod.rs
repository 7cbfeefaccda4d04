// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// Remote retrieval failed
    #[error("Failed to fetch {url}: {reason}")]
    FetchFailure { url: String, reason: String },

    /// External media tool exited unsuccessfully
    #[error("{operation} failed: media tool exited with {}", exit_code_label(.code))]
    ToolFailure { operation: String, code: Option<i32> },

    /// External media tool did not finish in time
    #[error("{operation} timed out after {seconds}s")]
    ToolTimeout { operation: String, seconds: u64 },

    /// External binary could not be started at all
    #[error("Failed to launch {binary}: {reason}")]
    SpawnFailure { binary: String, reason: String },

    /// Duration line missing from probe output (strict probing only)
    #[error("No duration found in probe output for {0}")]
    ProbeAmbiguous(String),

    /// A segment list required for pairing is empty
    #[error("Segment list is empty: {0}")]
    EmptySegmentList(String),

    /// Planned segment count exceeds what the ordinal padding can order
    #[error("Plan produces {planned} segments but ordinal padding only orders {max}")]
    SegmentOverflow { planned: usize, max: usize },

    /// File system operation failed
    #[error("File system error: {0}")]
    FsFail(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl DomainError {
    /// Whether this error came from an external process rather than local validation
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            DomainError::FetchFailure { .. }
                | DomainError::ToolFailure { .. }
                | DomainError::ToolTimeout { .. }
                | DomainError::SpawnFailure { .. }
        )
    }
}
