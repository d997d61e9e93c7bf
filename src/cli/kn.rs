//! CLI entry-point for the kilonova filter.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use crate::{
    alerts::columns,
    cli::{output_path, partitions},
    config::Settings,
    notify::Dispatcher,
    photometry::DcMag,
    pipeline::{self, FLAG_COLUMN},
};

/// Args for the `kn` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Parquet file, or directory of Parquet partitions.
    #[arg(long)]
    pub input: PathBuf,
    /// Where flag CSVs are written; defaults to OUTPUTS_DIR.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    /// Evaluate without posting notifications.
    #[arg(long)]
    pub dry_run: bool,
    /// Partitions evaluated at the same time.
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let inputs = partitions(&args.input)?;
    if inputs.is_empty() {
        warn!(input = %args.input.display(), "no parquet partitions found");
        return Ok(());
    }

    let dispatcher = if args.dry_run {
        None
    } else {
        Some(Dispatcher::new(settings.endpoints.clone())?)
    };
    let dispatcher = dispatcher.as_ref();
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| settings.outputs_dir.clone());
    let output_dir = output_dir.as_path();
    let portal_url = settings.portal_url.as_str();

    let accepted = stream::iter(inputs)
        .map(|path| async move {
            process_partition(&path, output_dir, portal_url, dispatcher)
                .await
                .with_context(|| format!("kilonova filter on {}", path.display()))
        })
        .buffer_unordered(args.concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    info!(
        partitions = accepted.len(),
        accepted = accepted.iter().sum::<usize>(),
        "kilonova filter finished"
    );
    Ok(())
}

/// Evaluate one partition and write its flags; returns the accepted count.
async fn process_partition(
    path: &Path,
    output_dir: &Path,
    portal_url: &str,
    dispatcher: Option<&Dispatcher>,
) -> Result<usize> {
    let df = columns::read_parquet(path)?;
    let alerts = columns::decode_alerts(&df)?;
    let evaluation = pipeline::run(&alerts, &DcMag, portal_url, dispatcher).await?;

    let object_ids: Vec<String> = alerts.iter().map(|a| a.object_id.clone()).collect();
    let mut frame = columns::flag_frame(&object_ids, &evaluation.flags, FLAG_COLUMN)?;
    columns::write_csv(&mut frame, &output_path(output_dir, path, "kn"))?;

    let accepted = evaluation.accepted().count();
    info!(
        partition = %path.display(),
        rows = alerts.len(),
        candidates = evaluation.candidates.len(),
        accepted,
        "partition evaluated"
    );
    Ok(accepted)
}
