//! FFmpeg execution adapter
//!
//! Spawns external binaries with a fixed argument vector, streams their output
//! into the log and reports the exit status. The same runner drives the
//! downloader.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::domain::errors::*;
use crate::ports::*;

/// Everything an external process produced
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ToolStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Runs one external binary, optionally bounded by a timeout
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    binary: String,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Kill the process and fail with `ToolTimeout` once `timeout` elapses
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Run to completion. Output is always logged at trace level and kept in
    /// the returned value only when `capture` is set.
    pub async fn execute(&self, args: &[String], capture: bool) -> Result<ProcessOutput, DomainError> {
        debug!(binary = %self.binary, ?args, "Running external tool");

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::SpawnFailure {
                binary: self.binary.clone(),
                reason: e.to_string(),
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let completion = async move {
            let (stdout, stderr) = tokio::join!(
                drain(stdout, "stdout", capture),
                drain(stderr, "stderr", capture)
            );
            let status = child.wait().await;
            (status, stdout, stderr)
        };

        let (status, stdout, stderr) = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, completion).await.map_err(|_| {
                warn!(binary = %self.binary, "External tool timed out, killing it");
                DomainError::ToolTimeout {
                    operation: self.binary.clone(),
                    seconds: limit.as_secs(),
                }
            })?,
            None => completion.await,
        };

        let status = status.map_err(|e| DomainError::SpawnFailure {
            binary: self.binary.clone(),
            reason: format!("failed waiting for process: {}", e),
        })?;

        debug!(binary = %self.binary, code = ?status.code(), "External tool finished");

        Ok(ProcessOutput {
            status: ToolStatus { code: status.code() },
            stdout,
            stderr,
        })
    }
}

/// Read a child stream to the end, line by line, tolerating invalid UTF-8
async fn drain<R>(reader: Option<R>, stream: &'static str, capture: bool) -> String
where
    R: AsyncRead + Unpin,
{
    let mut captured = String::new();
    let Some(reader) = reader else {
        return captured;
    };

    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buffer);
                let line = line.trim_end_matches(['\r', '\n']);
                trace!(stream, "{}", line);
                if capture {
                    captured.push_str(line);
                    captured.push('\n');
                }
            }
            Err(e) => {
                debug!(stream, error = %e, "Stopped reading tool output");
                break;
            }
        }
    }
    captured
}

/// FFmpeg-based media tool adapter
pub struct FFmpegAdapter {
    runner: ProcessRunner,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(binary: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            runner: ProcessRunner::new(binary).with_timeout(timeout),
        }
    }
}

#[async_trait]
impl ToolPort for FFmpegAdapter {
    async fn run(&self, args: &[String]) -> Result<ToolStatus, DomainError> {
        Ok(self.runner.execute(args, false).await?.status)
    }

    async fn run_capturing(&self, args: &[String]) -> Result<ToolOutput, DomainError> {
        let output = self.runner.execute(args, true).await?;
        Ok(ToolOutput {
            status: output.status,
            diagnostics: output.stderr,
        })
    }
}
