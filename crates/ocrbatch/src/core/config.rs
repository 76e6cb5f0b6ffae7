//! Configuration loading and run resolution.
//!
//! [`BatchConfig`] holds the tunables that can live in an `ocrbatch.toml`
//! file. [`RunConfig`] is the resolved, validated configuration of a single
//! invocation; it is built once by the caller and passed down by reference.

use crate::{OcrBatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for the default worker count.
pub const MAX_DEFAULT_WORKERS: usize = 8;

/// Default per-image timeout for the OCR engine.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Name of the configuration file searched for by [`BatchConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "ocrbatch.toml";

/// File-level batch configuration.
///
/// # Example
///
/// ```rust
/// use ocrbatch::core::config::BatchConfig;
///
/// let config = BatchConfig::default();
/// assert_eq!(config.timeout_secs, 30);
/// assert_eq!(config.engine.tesseract_cmd, "tesseract");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Worker count override (None = available cores, capped at 8).
    #[serde(default)]
    pub max_workers: Option<usize>,

    /// Wall-clock limit for a single engine invocation, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub engine: EngineConfig,
}

/// How to reach the OCR engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Executable name or path.
    #[serde(default = "default_tesseract_cmd")]
    pub tesseract_cmd: String,

    /// Environment variable that points at the engine's language data.
    #[serde(default = "default_tessdata_var")]
    pub tessdata_var: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: default_tesseract_cmd(),
            tessdata_var: default_tessdata_var(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            engine: EngineConfig::default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_tesseract_cmd() -> String {
    "tesseract".to_string()
}

fn default_tessdata_var() -> String {
    "TESSDATA_PREFIX".to_string()
}

/// Available execution units on this host, capped at [`MAX_DEFAULT_WORKERS`].
pub fn default_worker_count() -> usize {
    num_cpus::get().clamp(1, MAX_DEFAULT_WORKERS)
}

impl BatchConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `OcrBatchError::Validation` if the file cannot be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            OcrBatchError::validation(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| OcrBatchError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Discover `ocrbatch.toml` in the current directory or any parent.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(OcrBatchError::Io)?;

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "Using discovered config file");
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

/// Resolved configuration of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input: PathBuf,
    /// Where the engine writes `.txt` files. None = return text in memory.
    pub output_dir: Option<PathBuf>,
    pub workers: usize,
    pub timeout: Duration,
    pub engine: EngineConfig,
}

impl RunConfig {
    /// Resolve a run configuration.
    ///
    /// `workers` takes precedence over `config.max_workers`, which takes
    /// precedence over [`default_worker_count`].
    ///
    /// # Errors
    ///
    /// Returns `OcrBatchError::Validation` for a zero worker count or a zero timeout.
    pub fn new(
        input: impl Into<PathBuf>,
        output_dir: Option<PathBuf>,
        workers: Option<usize>,
        config: &BatchConfig,
    ) -> Result<Self> {
        let workers = workers.or(config.max_workers).unwrap_or_else(default_worker_count);
        if workers == 0 {
            return Err(OcrBatchError::validation("worker count must be a positive integer"));
        }

        if config.timeout_secs == 0 {
            return Err(OcrBatchError::validation("timeout_secs must be > 0"));
        }

        Ok(Self {
            input: input.into(),
            output_dir,
            workers,
            timeout: Duration::from_secs(config.timeout_secs),
            engine: config.engine.clone(),
        })
    }
}
