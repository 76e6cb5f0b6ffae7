//! Worker pool scheduling for a batch of candidates.
//!
//! One coordinating loop owns every counter. It hands out worker slots from a
//! semaphore sized to the worker count, spawns one task per candidate once a
//! slot is free, and drains finished tasks from a `JoinSet`. Workers only
//! return their [`TaskOutcome`]; they never touch the tally.
//!
//! Slots are acquired by the coordinator in submission order, so queued
//! candidates start first-in first-out. Completion order is arbitrary.

use crate::core::io::CandidateFile;
use crate::ocr::{Recognizer, TaskOutcome, TaskStatus};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A progress update is emitted after every this many completions.
pub const PROGRESS_INTERVAL: usize = 10;

/// Snapshot of batch progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl BatchProgress {
    /// Completions per second since the batch started.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { self.completed as f64 / secs } else { 0.0 }
    }
}

/// Receives progress updates from a running batch.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: &BatchProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    fn on_progress(&self, progress: &BatchProgress) {
        self(progress)
    }
}

/// True after every [`PROGRESS_INTERVAL`]th completion and after the last one.
pub fn progress_due(completed: usize, total: usize) -> bool {
    completed > 0 && (completed % PROGRESS_INTERVAL == 0 || completed == total)
}

/// Counters collected by the coordinator while a batch runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchTally {
    pub success_count: usize,
    /// Failures of any kind, timeouts included.
    pub failure_count: usize,
    /// Subset of `failure_count` caused by the timeout.
    pub timeout_count: usize,
    /// `(file name, text)` in completion order; empty when writing to disk.
    pub results: Vec<(String, String)>,
}

impl BatchTally {
    /// Fold one outcome into the tally.
    pub fn record(&mut self, outcome: TaskOutcome) {
        match outcome.status {
            TaskStatus::Success => {
                self.success_count += 1;
                if let Some(text) = outcome.text {
                    self.results.push((outcome.file_name, text));
                }
            }
            TaskStatus::Timeout => {
                self.failure_count += 1;
                self.timeout_count += 1;
            }
            TaskStatus::Failure => {
                self.failure_count += 1;
            }
        }
    }

    pub fn completed(&self) -> usize {
        self.success_count + self.failure_count
    }
}

/// Recognize every candidate on a pool of `worker_count` workers.
///
/// Blocks until every task has reached a terminal outcome. A task that
/// panics is logged and counted as a failure; the rest of the batch keeps
/// running. A `worker_count` of zero is treated as one.
pub async fn run_batch(
    candidates: Vec<CandidateFile>,
    output_dir: Option<&Path>,
    worker_count: usize,
    recognizer: &Recognizer,
) -> BatchTally {
    run_batch_with_progress(candidates, output_dir, worker_count, recognizer, None).await
}

/// [`run_batch`] with an optional progress observer.
#[tracing::instrument(
    skip_all,
    fields(
        batch.size = candidates.len(),
        batch.workers = worker_count,
    )
)]
pub async fn run_batch_with_progress(
    candidates: Vec<CandidateFile>,
    output_dir: Option<&Path>,
    worker_count: usize,
    recognizer: &Recognizer,
    progress: Option<&dyn ProgressSink>,
) -> BatchTally {
    let total = candidates.len();
    let mut tally = BatchTally::default();

    if total == 0 {
        return tally;
    }

    let started = Instant::now();
    let recognizer = Arc::new(recognizer.clone());
    let output_dir: Option<Arc<PathBuf>> = output_dir.map(|dir| Arc::new(dir.to_path_buf()));
    let semaphore = Arc::new(Semaphore::new(worker_count.max(1)));

    let mut pending = candidates.into_iter();
    let mut next = pending.next();
    let mut in_flight: HashMap<tokio::task::Id, (String, PathBuf)> = HashMap::new();
    let mut tasks = JoinSet::new();

    loop {
        tokio::select! {
            biased;

            Some(joined) = tasks.join_next_with_id(), if !tasks.is_empty() => {
                let outcome = match joined {
                    Ok((id, outcome)) => {
                        in_flight.remove(&id);
                        outcome
                    }
                    Err(join_err) => {
                        let (name, path) = in_flight.remove(&join_err.id()).unwrap_or_default();
                        tracing::error!(file = %name, "Recognition task failed: {}", join_err);
                        TaskOutcome::failed(name, path, format!("Task panicked: {}", join_err))
                    }
                };

                tally.record(outcome);

                let completed = tally.completed();
                if progress_due(completed, total) {
                    let update = BatchProgress {
                        completed,
                        total,
                        elapsed: started.elapsed(),
                    };
                    tracing::info!(
                        completed,
                        total,
                        "Processed {}/{} files ({:.2} files/sec)",
                        completed,
                        total,
                        update.rate()
                    );
                    if let Some(sink) = progress {
                        sink.on_progress(&update);
                    }
                }
            }

            permit = Arc::clone(&semaphore).acquire_owned(), if next.is_some() => {
                let Some(candidate) = next.take() else { continue };
                next = pending.next();

                let permit = match permit {
                    Ok(permit) => permit,
                    Err(e) => {
                        tracing::error!(file = %candidate.name, "Worker pool closed: {}", e);
                        tally.record(TaskOutcome::failed(&candidate.name, &candidate.path, e.to_string()));
                        continue;
                    }
                };

                let label = (candidate.name.clone(), candidate.path.clone());
                let recognizer = Arc::clone(&recognizer);
                let output_dir = output_dir.clone();

                let handle = tasks.spawn(async move {
                    let _permit = permit;
                    recognizer.recognize(&candidate, output_dir.as_deref().map(PathBuf::as_path)).await
                });
                in_flight.insert(handle.id(), label);
            }

            else => break,
        }
    }

    tally
}
