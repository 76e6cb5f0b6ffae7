//! Top-level batch driver.
//!
//! Order of operations for one invocation:
//! 1. Pre-flight check of the OCR engine ([`convert`] only)
//! 2. Discovery of the input location
//! 3. Output directory creation, only once at least one image was found
//! 4. Recognition: a single file goes straight to the recognizer, a
//!    directory goes through the worker pool
//! 5. Summary

use crate::core::batch::{BatchTally, ProgressSink, run_batch_with_progress};
use crate::core::config::RunConfig;
use crate::core::io::{discover, duplicate_stems, ensure_output_dir};
use crate::core::summary::{BatchSummary, summarize};
use crate::ocr::{Recognizer, preflight};
use crate::{OcrBatchError, Result};

/// Run a full conversion against the real engine configured in `config`.
///
/// # Errors
///
/// Returns `OcrBatchError::Prerequisite` if the engine is unusable,
/// `OcrBatchError::NotFound` if the input does not exist and
/// `OcrBatchError::EmptyInput` if it holds no supported image.
/// Individual file failures are counted in the summary, not returned.
pub async fn convert(config: &RunConfig) -> Result<BatchSummary> {
    preflight(&config.engine).await?;
    let recognizer = Recognizer::from_config(config);
    run_pipeline(config, &recognizer, None).await
}

/// Run discovery, recognition and aggregation with the given recognizer.
///
/// No pre-flight check happens here. Batch-level failures are logged at
/// `error` level before they are returned.
#[tracing::instrument(
    skip_all,
    fields(
        input = %config.input.display(),
        workers = config.workers,
    )
)]
pub async fn run_pipeline(
    config: &RunConfig,
    recognizer: &Recognizer,
    progress: Option<&dyn ProgressSink>,
) -> Result<BatchSummary> {
    run_stages(config, recognizer, progress)
        .await
        .inspect_err(OcrBatchError::log_if_batch_level)
}

async fn run_stages(
    config: &RunConfig,
    recognizer: &Recognizer,
    progress: Option<&dyn ProgressSink>,
) -> Result<BatchSummary> {
    let discovery = discover(&config.input)?;

    let (images, other_count) = if discovery.single_file {
        let (images, others): (Vec<_>, Vec<_>) = discovery.candidates.into_iter().partition(|c| c.is_recognized());
        (images, others.len())
    } else {
        (discovery.candidates, discovery.other_count)
    };

    if images.is_empty() {
        return summarize(&config.input, BatchTally::default(), other_count);
    }

    if let Some(dir) = &config.output_dir {
        for stem in duplicate_stems(&images) {
            tracing::warn!(
                stem = %stem,
                "Several images share the base name {:?}; only one {}.txt will survive in {}",
                stem,
                stem,
                dir.display()
            );
        }
        ensure_output_dir(dir)?;
    }

    let tally = if discovery.single_file {
        let mut tally = BatchTally::default();
        for candidate in &images {
            tally.record(recognizer.recognize(candidate, config.output_dir.as_deref()).await);
        }
        tally
    } else {
        tracing::info!(
            images = images.len(),
            workers = config.workers,
            "Processing {} image(s) with {} worker(s)",
            images.len(),
            config.workers
        );
        run_batch_with_progress(images, config.output_dir.as_deref(), config.workers, recognizer, progress).await
    };

    summarize(&config.input, tally, other_count)
}
