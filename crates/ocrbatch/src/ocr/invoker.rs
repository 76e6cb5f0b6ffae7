//! Single-image recognition.
//!
//! [`Recognizer::recognize`] runs the engine once for one candidate and always
//! returns a [`TaskOutcome`]. Spawn failures, non-zero exits, timeouts and
//! read-back I/O errors are all folded into the outcome.
//!
//! Engine contract: `tesseract <input-image> <output-base>` writes
//! `<output-base>.txt` and exits 0 on success.

use crate::core::config::RunConfig;
use crate::core::io::CandidateFile;
use crate::ocr::runner::{CommandRunner, ProcessRunner};
use crate::{OcrBatchError, Result};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// RAII guard for an invocation-private scratch directory.
///
/// Creation goes through `tokio::fs`. Removal in `Drop` is synchronous:
/// the directory must be gone by the time `recognize` returns, and a
/// spawned cleanup task would not guarantee that.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    async fn create(root: &Path) -> Result<Self> {
        let path = root.join(format!("ocrbatch_{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), "Failed to remove scratch directory: {}", e);
        }
    }
}

/// Terminal state of one recognition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Success,
    Failure,
    Timeout,
}

/// Result of one recognition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOutcome {
    pub file_name: String,
    pub path: PathBuf,
    pub status: TaskStatus,
    /// Recovered text; only set in no-output-directory mode.
    pub text: Option<String>,
    /// Diagnostic message for failures.
    pub message: Option<String>,
}

impl TaskOutcome {
    fn success(candidate: &CandidateFile, text: Option<String>) -> Self {
        Self {
            file_name: candidate.name.clone(),
            path: candidate.path.clone(),
            status: TaskStatus::Success,
            text,
            message: None,
        }
    }

    fn from_error(candidate: &CandidateFile, err: OcrBatchError) -> Self {
        let status = match err {
            OcrBatchError::Timeout { .. } => TaskStatus::Timeout,
            _ => TaskStatus::Failure,
        };

        Self {
            file_name: candidate.name.clone(),
            path: candidate.path.clone(),
            status,
            text: None,
            message: Some(err.to_string()),
        }
    }

    /// Failure outcome for a task that never produced one (e.g. it panicked).
    pub fn failed(file_name: impl Into<String>, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            path: path.into(),
            status: TaskStatus::Failure,
            text: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}

/// Runs the OCR engine for individual candidates.
///
/// Holds no mutable state, so one instance can be shared by every worker.
#[derive(Clone)]
pub struct Recognizer {
    runner: Arc<dyn ProcessRunner>,
    timeout: Duration,
    scratch_root: PathBuf,
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recognizer")
            .field("timeout", &self.timeout)
            .field("scratch_root", &self.scratch_root)
            .finish_non_exhaustive()
    }
}

impl Recognizer {
    pub fn new(runner: Arc<dyn ProcessRunner>, timeout: Duration) -> Self {
        Self {
            runner,
            timeout,
            scratch_root: std::env::temp_dir(),
        }
    }

    /// Recognizer driving the real tesseract binary named in `config`.
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(Arc::new(CommandRunner::tesseract(&config.engine)), config.timeout)
    }

    /// Place scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = root.into();
        self
    }

    /// Recognize one candidate.
    ///
    /// With `output_dir`, the engine writes `<output_dir>/<stem>.txt` and the
    /// outcome carries no text. Without it, the engine writes into a private
    /// scratch directory, the text is read back into the outcome, and the
    /// scratch directory is removed before this returns.
    pub async fn recognize(&self, candidate: &CandidateFile, output_dir: Option<&Path>) -> TaskOutcome {
        let base_name = candidate.stem();

        let outcome = match output_dir {
            Some(dir) => match self.run_engine(&candidate.path, &dir.join(&base_name)).await {
                Ok(()) => TaskOutcome::success(candidate, None),
                Err(e) => TaskOutcome::from_error(candidate, e),
            },
            None => match self.recognize_to_memory(candidate, &base_name).await {
                Ok(text) => TaskOutcome::success(candidate, Some(text)),
                Err(e) => TaskOutcome::from_error(candidate, e),
            },
        };

        match &outcome.message {
            None => tracing::debug!(file = %candidate.name, "Recognized"),
            Some(message) => tracing::warn!(file = %candidate.name, status = ?outcome.status, "{}", message),
        }

        outcome
    }

    async fn recognize_to_memory(&self, candidate: &CandidateFile, base_name: &str) -> Result<String> {
        let scratch = ScratchDir::create(&self.scratch_root).await?;

        self.run_engine(&candidate.path, &scratch.path().join(base_name)).await?;

        let text_path = scratch.path().join(format!("{}.txt", base_name));
        let bytes = tokio::fs::read(&text_path).await.map_err(|e| {
            OcrBatchError::process(format!(
                "Engine reported success but {} could not be read: {}",
                text_path.display(),
                e
            ))
        })?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn run_engine(&self, input: &Path, output_base: &Path) -> Result<()> {
        let args: [OsString; 2] = [input.as_os_str().to_owned(), output_base.as_os_str().to_owned()];
        let output = self.runner.invoke(&args, self.timeout).await?;

        if !output.success {
            return Err(OcrBatchError::process(output.diagnostics()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::runner::ProcessOutput;
    use async_trait::async_trait;
    use std::fs::File;
    use tempfile::tempdir;

    /// Writes `<base>.txt` unless told otherwise.
    enum Behavior {
        Write(&'static str),
        Exit(i32, &'static str),
        SucceedWithoutOutput,
        Hang,
    }

    struct StubRunner(Behavior);

    #[async_trait]
    impl ProcessRunner for StubRunner {
        async fn invoke(&self, args: &[OsString], timeout: Duration) -> Result<ProcessOutput> {
            let base = PathBuf::from(&args[1]);
            match &self.0 {
                Behavior::Write(text) => {
                    std::fs::write(format!("{}.txt", base.display()), text)?;
                    Ok(ProcessOutput {
                        exit_code: Some(0),
                        success: true,
                        ..Default::default()
                    })
                }
                Behavior::Exit(code, stderr) => Ok(ProcessOutput {
                    exit_code: Some(*code),
                    success: false,
                    stderr: stderr.to_string(),
                    ..Default::default()
                }),
                Behavior::SucceedWithoutOutput => Ok(ProcessOutput {
                    exit_code: Some(0),
                    success: true,
                    ..Default::default()
                }),
                Behavior::Hang => {
                    std::fs::write(format!("{}.txt", base.display()), "partial")?;
                    Err(OcrBatchError::Timeout { timeout })
                }
            }
        }
    }

    fn candidate(dir: &Path, name: &str) -> CandidateFile {
        let path = dir.join(name);
        File::create(&path).unwrap();
        CandidateFile::from_path(&path).unwrap()
    }

    fn recognizer(behavior: Behavior, scratch_root: &Path) -> Recognizer {
        Recognizer::new(Arc::new(StubRunner(behavior)), Duration::from_secs(30)).with_scratch_root(scratch_root)
    }

    fn scratch_entries(root: &Path) -> usize {
        std::fs::read_dir(root).unwrap().count()
    }

    #[tokio::test]
    async fn test_recognize_to_memory_returns_text_and_cleans_up() {
        let input = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let recognizer = recognizer(Behavior::Write("hello world"), scratch.path());

        let outcome = recognizer.recognize(&candidate(input.path(), "page.png"), None).await;

        assert_eq!(outcome.status, TaskStatus::Success);
        assert_eq!(outcome.text.as_deref(), Some("hello world"));
        assert_eq!(outcome.file_name, "page.png");
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_recognize_to_output_dir() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let recognizer = recognizer(Behavior::Write("on disk"), scratch.path());

        let outcome = recognizer
            .recognize(&candidate(input.path(), "Scan.TIFF"), Some(output.path()))
            .await;

        assert!(outcome.is_success());
        assert!(outcome.text.is_none());
        let written = std::fs::read_to_string(output.path().join("Scan.txt")).unwrap();
        assert_eq!(written, "on disk");
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_failure_with_diagnostics() {
        let input = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let recognizer = recognizer(Behavior::Exit(1, "Error in pixReadStream"), scratch.path());

        let outcome = recognizer.recognize(&candidate(input.path(), "bad.png"), None).await;

        assert_eq!(outcome.status, TaskStatus::Failure);
        assert!(outcome.message.unwrap().contains("Error in pixReadStream"));
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_missing_output_file_is_failure_and_cleans_up() {
        let input = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let recognizer = recognizer(Behavior::SucceedWithoutOutput, scratch.path());

        let outcome = recognizer.recognize(&candidate(input.path(), "empty.png"), None).await;

        assert_eq!(outcome.status, TaskStatus::Failure);
        assert!(outcome.message.is_some());
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_timeout_is_reported_and_cleans_up() {
        let input = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let recognizer = recognizer(Behavior::Hang, scratch.path());

        let outcome = recognizer.recognize(&candidate(input.path(), "slow.png"), None).await;

        assert_eq!(outcome.status, TaskStatus::Timeout);
        assert!(!outcome.is_success());
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_unwritable_scratch_root_is_failure() {
        let input = tempdir().unwrap();
        let blocker = input.path().join("not-a-dir");
        File::create(&blocker).unwrap();
        let recognizer = recognizer(Behavior::Write("unused"), &blocker);

        let outcome = recognizer.recognize(&candidate(input.path(), "page.png"), None).await;

        assert_eq!(outcome.status, TaskStatus::Failure);
    }

    #[tokio::test]
    async fn test_scratch_dir_removed_on_drop() {
        let root = tempdir().unwrap();
        let path = {
            let scratch = ScratchDir::create(root.path()).await.unwrap();
            std::fs::write(scratch.path().join("x.txt"), "x").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
