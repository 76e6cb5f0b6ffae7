//! External process invocation.
//!
//! The recognition invoker never spawns processes itself; it goes through a
//! [`ProcessRunner`]. Production code uses [`CommandRunner`], tests substitute
//! a fake that writes result files without a real OCR engine.

use crate::core::config::EngineConfig;
use crate::{OcrBatchError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or None if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Diagnostic text for a failed run: stderr, falling back to stdout.
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("process exited with status {:?}", self.exit_code)
    }
}

/// Runs one external process to completion with a wall-clock limit.
///
/// # Thread Safety
///
/// Runners are shared by every worker of a batch and must be `Send + Sync`.
///
/// # Errors
///
/// Implementations return `OcrBatchError::Timeout` when `timeout` expires
/// (the process must be terminated) and `OcrBatchError::Process` when the
/// process cannot be spawned or awaited. A non-zero exit is *not* an error;
/// it is reported through [`ProcessOutput::success`].
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn invoke(&self, args: &[OsString], timeout: Duration) -> Result<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `tokio::process::Command`.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: PathBuf,
}

impl CommandRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Runner for the configured tesseract executable.
    pub fn tesseract(engine: &EngineConfig) -> Self {
        Self::new(&engine.tesseract_cmd)
    }
}

#[async_trait]
impl ProcessRunner for CommandRunner {
    async fn invoke(&self, args: &[OsString], timeout: Duration) -> Result<ProcessOutput> {
        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                OcrBatchError::process(format!("Failed to execute {}: {}", self.program.display(), e))
            })?;

        let child_id = child.id();

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(OcrBatchError::process(format!(
                    "Failed to wait for {}: {}",
                    self.program.display(),
                    e
                )));
            }
            Err(_) => {
                // wait_with_output was cancelled; kill_on_drop terminates the child
                tracing::warn!(pid = ?child_id, "{} exceeded {:?}, killed", self.program.display(), timeout);
                return Err(OcrBatchError::Timeout { timeout });
            }
        };

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
