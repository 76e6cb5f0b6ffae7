//! Shared helpers for integration tests.
//!
//! [`FakeEngine`] stands in for tesseract. Its behavior is picked from the
//! input file name:
//! - contains `fail`: exits 1 with a diagnostic on stderr
//! - contains `slow`: writes a partial result, then runs past the timeout
//! - contains `panic`: panics inside the worker task
//! - anything else: writes `<base>.txt` containing `text of <stem>`

#![allow(dead_code)]

use async_trait::async_trait;
use ocrbatch::core::config::{BatchConfig, RunConfig};
use ocrbatch::{OcrBatchError, ProcessOutput, ProcessRunner, Recognizer, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FAKE_STDERR: &str = "fake engine: unable to read image";

#[derive(Debug, Default)]
pub struct FakeEngine {
    delay: Duration,
    running: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    started: Mutex<Vec<String>>,
}

struct RunningGuard<'a>(&'a AtomicUsize);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every successful invocation sleeps for `delay` before writing.
    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Default::default()
        })
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Input file names in the order invocations started.
    pub fn start_order(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for FakeEngine {
    async fn invoke(&self, args: &[OsString], timeout: Duration) -> Result<ProcessOutput> {
        let input = PathBuf::from(&args[0]);
        let base = PathBuf::from(&args[1]);
        let name = input.file_name().unwrap().to_string_lossy().into_owned();

        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.lock().unwrap().push(name.clone());
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _running = RunningGuard(&self.running);

        if name.contains("panic") {
            panic!("fake engine crashed on {}", name);
        }

        if name.contains("fail") {
            return Ok(ProcessOutput {
                exit_code: Some(1),
                success: false,
                stderr: FAKE_STDERR.to_string(),
                ..Default::default()
            });
        }

        if name.contains("slow") {
            std::fs::write(text_path(&base), "partial")?;
            let hang = tokio::time::sleep(timeout + Duration::from_secs(60));
            if tokio::time::timeout(timeout, hang).await.is_err() {
                return Err(OcrBatchError::Timeout { timeout });
            }
        }

        tokio::time::sleep(self.delay).await;

        let stem = input.file_stem().unwrap().to_string_lossy().into_owned();
        std::fs::write(text_path(&base), format!("text of {}", stem))?;

        Ok(ProcessOutput {
            exit_code: Some(0),
            success: true,
            ..Default::default()
        })
    }
}

pub fn text_path(base: &Path) -> PathBuf {
    PathBuf::from(format!("{}.txt", base.display()))
}

/// Create empty files with the given names under `dir`.
pub fn create_files(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"").unwrap();
    }
}

/// Recognizer over `engine` with scratch directories under `scratch_root`.
pub fn recognizer(engine: &Arc<FakeEngine>, timeout: Duration, scratch_root: &Path) -> Recognizer {
    let runner: Arc<dyn ProcessRunner> = engine.clone();
    Recognizer::new(runner, timeout).with_scratch_root(scratch_root)
}

pub fn run_config(input: &Path, output_dir: Option<PathBuf>, workers: usize) -> RunConfig {
    RunConfig::new(input, output_dir, Some(workers), &BatchConfig::default()).unwrap()
}

/// Number of entries directly inside `dir`.
pub fn entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
