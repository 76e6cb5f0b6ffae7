//! Batch result aggregation and reporting.

use crate::core::batch::BatchTally;
use crate::core::formats::supported_extensions;
use crate::{OcrBatchError, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Text recovered for one file in no-output-directory mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognizedText {
    pub file_name: String,
    pub text: String,
}

/// Final report of a batch. Every discovered file is counted exactly once as
/// converted, failed, or skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub image_count: usize,
    pub other_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// Subset of `failure_count`.
    pub timeout_count: usize,
    /// Recovered text in scheduler completion order.
    pub results: Vec<RecognizedText>,
}

/// Build the final summary of a batch.
///
/// # Errors
///
/// Returns `OcrBatchError::EmptyInput` when no recognized image was processed.
pub fn summarize(input: &Path, tally: BatchTally, other_count: usize) -> Result<BatchSummary> {
    let image_count = tally.success_count + tally.failure_count;

    if image_count == 0 {
        return Err(OcrBatchError::EmptyInput {
            path: input.to_path_buf(),
            supported: supported_extensions(),
        });
    }

    let summary = BatchSummary {
        total: image_count + other_count,
        image_count,
        other_count,
        success_count: tally.success_count,
        failure_count: tally.failure_count,
        timeout_count: tally.timeout_count,
        results: tally
            .results
            .into_iter()
            .map(|(file_name, text)| RecognizedText { file_name, text })
            .collect(),
    };

    tracing::info!(
        total = summary.total,
        success = summary.success_count,
        failed = summary.failure_count,
        skipped = summary.other_count,
        "Batch complete"
    );

    Ok(summary)
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        self.failure_count > 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total files: {}", self.total)?;
        writeln!(f, "Successfully converted: {}", self.success_count)?;
        if self.timeout_count > 0 {
            writeln!(f, "Failed: {} ({} timed out)", self.failure_count, self.timeout_count)?;
        } else {
            writeln!(f, "Failed: {}", self.failure_count)?;
        }
        write!(f, "Skipped (not an image): {}", self.other_count)
    }
}
