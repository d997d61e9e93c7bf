//! Command-line interface wiring for kn-rate-filter.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use walkdir::WalkDir;

use crate::config::Settings;

pub mod kn;
pub mod sn;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Transient alert candidate filters", long_about = None)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Kn(args) => kn::run(args, settings).await,
            Commands::Sn(args) => sn::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Flag fast-fading kilonova candidates and notify configured webhooks.
    Kn(kn::Args),
    /// Flag supernova candidates.
    Sn(sn::Args),
}

/// Parquet partitions under `input`, sorted; a file is its own single partition.
pub fn partitions(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("input {} does not exist", input.display());
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(input).follow_links(true) {
        let entry = entry?;
        let is_parquet = entry
            .path()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("parquet"))
            .unwrap_or(false);
        if entry.file_type().is_file() && is_parquet {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Output file for a partition: `<output_dir>/<stem>.<suffix>.csv`.
pub fn output_path(output_dir: &Path, partition: &Path, suffix: &str) -> PathBuf {
    let stem = partition
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "partition".to_string());
    output_dir.join(format!("{stem}.{suffix}.csv"))
}
