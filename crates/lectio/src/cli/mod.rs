pub mod entities;
pub mod normalize;
pub mod process;
pub mod topics;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lectio_core::config::PipelineConfig;
use lectio_core::ingest::{normalize_pages, CompositeParser, PageExtractor};

#[derive(Parser)]
#[command(
    name = "lectio",
    about = "Extract entities, topics and summaries from Italian study documents",
    version
)]
pub struct Cli {
    /// Configuration file (default: <config dir>/lectio/lectio.toml)
    #[arg(short, long, global = true, env = "LECTIO_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and print one JSON result per document
    Process {
        /// Files or directories to process
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Number of topics to fit
        #[arg(long)]
        topics: Option<usize>,
        /// Terms per topic descriptor
        #[arg(long)]
        words: Option<usize>,
        /// Ask the configured service for the school subject
        #[arg(long)]
        classify: bool,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the normalized text of a document
    Normalize {
        /// Document path
        path: PathBuf,
    },
    /// Print ranked persons and locations
    Entities {
        /// Document path
        path: PathBuf,
        /// Entities to show per category
        #[arg(long)]
        top: Option<usize>,
    },
    /// Print topic descriptors
    Topics {
        /// Document path
        path: PathBuf,
        /// Number of topics to fit
        #[arg(long)]
        topics: Option<usize>,
        /// Terms per topic descriptor
        #[arg(long)]
        words: Option<usize>,
    },
    /// Print the effective configuration
    Config,
}

pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    PipelineConfig::load(path).context("failed to load configuration")
}

/// Read a document and return its normalized text.
pub async fn read_normalized(path: &Path, config: &PipelineConfig) -> Result<String> {
    let raw = CompositeParser::default()
        .extract_file(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    Ok(normalize_pages(&raw.pages, &config.pipeline.page_separator))
}

pub fn show_config(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
