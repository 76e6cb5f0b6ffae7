//! ocrbatch CLI

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ocrbatch::{BatchConfig, BatchSummary, Recognizer, RunConfig, preflight, run_pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Output format for the final report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary followed by recovered text
    #[default]
    Text,
    /// The whole summary as one JSON document
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "ocrbatch")]
#[command(version, about = "Convert a directory of images to text with Tesseract", long_about = None)]
struct Cli {
    /// Image file or directory of images
    input: PathBuf,

    /// Directory for the generated .txt files (text is printed when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum concurrent recognitions
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-image timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Configuration file (defaults to the nearest ocrbatch.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<BatchConfig> {
    let config = match path {
        Some(path) => BatchConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BatchConfig::discover()
            .context("Failed to discover ocrbatch.toml")?
            .unwrap_or_default(),
    };
    Ok(config)
}

fn print_report(summary: &BatchSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", summary);
            for item in &summary.results {
                println!();
                println!("== {} ==", item.file_name);
                println!("{}", item.text.trim_end());
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
            println!("{}", json);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut batch_config = load_config(cli.config.as_ref())?;
    if let Some(timeout) = cli.timeout {
        batch_config.timeout_secs = timeout;
    }

    let input = std::path::absolute(&cli.input)
        .with_context(|| format!("Failed to resolve input path {}", cli.input.display()))?;
    let run_config = RunConfig::new(input, cli.output, cli.workers, &batch_config)?;

    preflight(&run_config.engine).await?;

    let recognizer = Recognizer::from_config(&run_config);
    let summary = run_pipeline(&run_config, &recognizer, None).await?;
    print_report(&summary, cli.format)?;

    if let Some(dir) = &run_config.output_dir
        && summary.success_count > 0
    {
        tracing::info!("Text files written to {}", dir.display());
    }

    Ok(())
}
