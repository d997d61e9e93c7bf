//! CLI entry-point for the supernova filter.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument, warn};

use crate::{
    alerts::columns,
    cli::{output_path, partitions},
    config::Settings,
    filters::supernova,
};

/// Args for the `sn` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Parquet file, or directory of Parquet partitions.
    #[arg(long)]
    pub input: PathBuf,
    /// Where flag CSVs are written; defaults to OUTPUTS_DIR.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let inputs = partitions(&args.input)?;
    if inputs.is_empty() {
        warn!(input = %args.input.display(), "no parquet partitions found");
        return Ok(());
    }
    let output_dir = args.output_dir.unwrap_or(settings.outputs_dir);

    for path in inputs {
        let df = columns::read_parquet(&path)?;
        let rows = columns::decode_sn_rows(&df)
            .with_context(|| format!("decode {}", path.display()))?;
        let flags = supernova::predicate(&rows);
        let ids: Vec<String> = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| row.object_id.clone().unwrap_or_else(|| idx.to_string()))
            .collect();
        let mut frame = columns::flag_frame(&ids, &flags, "sn_candidate")?;
        columns::write_csv(&mut frame, &output_path(&output_dir, &path, "sn"))?;
        info!(
            partition = %path.display(),
            rows = rows.len(),
            passed = flags.iter().filter(|flag| **flag).count(),
            "partition evaluated"
        );
    }
    Ok(())
}
