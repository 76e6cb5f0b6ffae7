//! ocrbatch - batch image-to-text conversion on top of Tesseract
//!
//! ocrbatch converts a directory (or a single file) of images into text by
//! running the external `tesseract` binary once per image, on a bounded pool
//! of workers. One bad image never stops the batch: every file ends up
//! converted, failed, or skipped, and the final [`BatchSummary`] says which.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ocrbatch::{BatchConfig, RunConfig, convert};
//!
//! # async fn example() -> ocrbatch::Result<()> {
//! // No output directory: recovered text is returned in memory
//! let config = RunConfig::new("scans/", None, Some(4), &BatchConfig::default())?;
//! let summary = convert(&config).await?;
//!
//! for item in &summary.results {
//!     println!("{}: {}", item.file_name, item.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): discovery, worker pool, aggregation, configuration
//! - **OCR Module** (`ocr`): engine invocation, process runner seam, pre-flight checks

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod ocr;

pub use error::{OcrBatchError, PrerequisiteError, Result};

pub use crate::core::batch::{BatchProgress, BatchTally, ProgressSink, run_batch, run_batch_with_progress};
pub use crate::core::config::{BatchConfig, EngineConfig, RunConfig, default_worker_count};
pub use crate::core::formats::{SUPPORTED_EXTENSIONS, is_recognized};
pub use crate::core::io::{CandidateFile, Discovery, discover};
pub use crate::core::pipeline::{convert, run_pipeline};
pub use crate::core::summary::{BatchSummary, RecognizedText, summarize};

pub use ocr::{CommandRunner, ProcessOutput, ProcessRunner, Recognizer, TaskOutcome, TaskStatus, preflight};
