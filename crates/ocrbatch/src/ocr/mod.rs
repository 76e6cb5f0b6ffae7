//! OCR engine integration.
//!
//! The engine is an external `tesseract` process used as a black box. This
//! module wraps a single invocation per image and the pre-flight checks that
//! must pass before a batch starts.
//!
//! - **runner**: the [`ProcessRunner`] seam and its `tokio::process` implementation
//! - **invoker**: [`Recognizer`], one image in, one [`TaskOutcome`] out
//! - **validation**: engine lookup and data-path checks
//!
//! # Example
//!
//! ```rust,no_run
//! use ocrbatch::core::config::{BatchConfig, RunConfig};
//! use ocrbatch::core::io::CandidateFile;
//! use ocrbatch::ocr::Recognizer;
//!
//! # async fn example() -> ocrbatch::Result<()> {
//! let config = RunConfig::new("scan.png", None, None, &BatchConfig::default())?;
//! let recognizer = Recognizer::from_config(&config);
//!
//! let outcome = recognizer.recognize(&CandidateFile::from_path("scan.png")?, None).await;
//! println!("{:?}: {}", outcome.status, outcome.text.unwrap_or_default());
//! # Ok(())
//! # }
//! ```
pub mod invoker;
pub mod runner;
pub mod validation;

pub use invoker::{Recognizer, TaskOutcome, TaskStatus};
pub use runner::{CommandRunner, ProcessOutput, ProcessRunner};
pub use validation::{check_engine_available, lookup_command, preflight, validate_data_path};
