//! Core batch orchestration.
//!
//! - **formats**: supported image extensions
//! - **io**: discovery of the input location and output directory handling
//! - **config**: `ocrbatch.toml` loading and per-run configuration
//! - **batch**: the bounded worker pool
//! - **summary**: aggregation of outcomes into a [`BatchSummary`]
//! - **pipeline**: the driver that ties them together
//!
//! # Example
//!
//! ```rust,no_run
//! use ocrbatch::core::config::{BatchConfig, RunConfig};
//! use ocrbatch::core::pipeline::convert;
//!
//! # async fn example() -> ocrbatch::Result<()> {
//! let config = RunConfig::new("scans/", Some("scans/converted-text".into()), None, &BatchConfig::default())?;
//! let summary = convert(&config).await?;
//! println!("{}", summary);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod formats;
pub mod io;
pub mod pipeline;
pub mod summary;

pub use batch::{BatchProgress, BatchTally, ProgressSink, run_batch, run_batch_with_progress};
pub use config::{BatchConfig, EngineConfig, RunConfig, default_worker_count};
pub use formats::{SUPPORTED_EXTENSIONS, is_recognized};
pub use io::{CandidateFile, Discovery, discover};
pub use pipeline::{convert, run_pipeline};
pub use summary::{BatchSummary, RecognizedText, summarize};
