//! Error types for ocrbatch.
//!
//! Batch-level failures are returned as `OcrBatchError` and stop the run
//! before any recognition task is submitted:
//!
//! - `NotFound` - the input path does not exist
//! - `EmptyInput` - the input holds no file with a supported image extension
//! - `Prerequisite` - the OCR engine (or its data path) is not usable
//!
//! Per-file failures never surface here. The recognition invoker folds them
//! into a [`TaskOutcome`](crate::ocr::TaskOutcome) so a single bad image cannot
//! abort its siblings.
//!
//! `Io` errors from `std::io::Error` bubble up unchanged.
//!
//! # Example
//!
//! ```rust
//! use ocrbatch::{OcrBatchError, Result};
//!
//! fn read_config(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!
//!     if content.is_empty() {
//!         return Err(OcrBatchError::validation(format!("Config file is empty: {}", path)));
//!     }
//!
//!     Ok(content)
//! }
//! ```
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using `OcrBatchError`.
pub type Result<T> = std::result::Result<T, OcrBatchError>;

/// Main error type for all ocrbatch operations.
#[derive(Debug, Error)]
pub enum OcrBatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No file or directory found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("No valid images found at {}. Supported extensions: {}", path.display(), supported.join(", "))]
    EmptyInput { path: PathBuf, supported: Vec<String> },

    #[error("Prerequisite check failed: {0}")]
    Prerequisite(#[from] PrerequisiteError),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Recognition timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Process error: {message}")]
    Process { message: String },
}

/// Reasons the OCR engine cannot be used on this host.
///
/// An unset data-path variable and one that is set to an empty string are
/// reported as different variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrerequisiteError {
    #[error("{command} missing, install tesseract-ocr and make sure it is on PATH")]
    EngineMissing { command: String },

    #[error("{var} environment variable is not set")]
    DataPathUnset { var: String },

    #[error("{var} environment variable is set but empty")]
    DataPathEmpty { var: String },

    #[error("{var} points to {}, which is not a readable directory", path.display())]
    DataPathUnreadable { var: String, path: PathBuf },
}

impl OcrBatchError {
    /// Create a Validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Create a Validation error with source
    pub fn validation_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a Process error
    pub fn process<S: Into<String>>(message: S) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    /// True for the errors that abort a whole batch rather than a single file.
    pub fn is_batch_level(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::EmptyInput { .. } | Self::Prerequisite(_)
        )
    }

    /// Emit an `error!` event if this error aborts the batch.
    pub(crate) fn log_if_batch_level(&self) {
        if self.is_batch_level() {
            tracing::error!("{}", self);
        }
    }
}
