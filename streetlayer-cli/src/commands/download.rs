//! Download command - acquire imagery for a configured region.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use streetlayer::acquisition::{AcquisitionOrchestrator, RunSummary};
use streetlayer::metadata::{metadata_filename, AcquisitionSession};
use streetlayer::provider::{AsyncReqwestClient, ImageryProvider, StreetViewProvider};
use streetlayer::sampler::{RegionSampler, RoadSampler};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{format_money, region_output_dir};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the download command.
pub struct DownloadArgs {
    pub region: String,
    pub count: Option<usize>,
    pub output: Option<PathBuf>,
    pub api_key: Option<String>,
    pub workers: Option<usize>,
    pub debug: bool,
}

/// Run the download command.
pub fn run(args: DownloadArgs) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup("download");
    let config = runner.config();

    // Configuration errors are fatal before anything is spent
    let context = runner.create_context();
    let network = runner.load_region(&context, &args.region)?;
    let api_key = config
        .resolve_api_key(args.api_key.as_deref())
        .ok_or(CliError::MissingApiKey)?;

    let target_count = args.count.unwrap_or(config.acquisition.target_count);
    let mut acquisition = config.acquisition_config();
    if let Some(workers) = args.workers {
        acquisition = acquisition.with_workers(workers);
    }

    let output_root = args
        .output
        .unwrap_or_else(|| config.output.directory.clone());
    let save_dir = region_output_dir(&output_root, &args.region);
    let metadata_path = save_dir.join(metadata_filename(&Local::now()));

    let http_client =
        AsyncReqwestClient::with_timeout(config.provider.timeout).map_err(CliError::Provider)?;
    let provider = StreetViewProvider::with_params(http_client, api_key, config.image_params());

    println!("streetlayer Download v{}", streetlayer::VERSION);
    println!("================================");
    println!();
    println!("Region:    {}", args.region);
    println!("Roads:     {}", network.len());
    println!("Target:    {} points ({} images)", target_count, target_count * 4);
    println!("Output:    {}", save_dir.display());
    println!("Provider:  {}", provider.name());
    println!("Workers:   {}", acquisition.workers());
    println!(
        "Budget:    {} of {} remaining",
        format_money(context.budget.remaining_budget()),
        format_money(context.budget.cap())
    );
    println!();
    println!("Press Ctrl+C to stop after in-flight downloads finish");
    println!();

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        handler_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let sampler = RegionSampler::new(network, RoadSampler::new(), acquisition.spacing_meters());
    let orchestrator =
        AcquisitionOrchestrator::new(Arc::new(provider), Arc::clone(&context.budget), acquisition)
            .with_cancellation(cancel);

    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;

    // The session saves metadata and budget even when the run errors out
    let mut session = AcquisitionSession::new(
        Arc::clone(&context.budget),
        runner.budget_store(),
        metadata_path.clone(),
    );
    let summary = runtime.block_on(orchestrator.run(
        &sampler,
        target_count,
        &save_dir,
        session.recorder_mut(),
    ))?;

    let metadata_written = session
        .finish()
        .map_err(|error| CliError::Persist {
            path: metadata_path.clone(),
            error,
        })?;

    info!(
        images = summary.images_acquired,
        reason = %summary.termination,
        "Download command finished"
    );
    print_summary(&summary, metadata_written.then_some(&metadata_path));

    Ok(())
}

fn print_summary(summary: &RunSummary, metadata: Option<&PathBuf>) {
    println!();
    println!("Images acquired:  {}", summary.images_acquired);
    println!("Batches:          {}", summary.batches);
    println!(
        "Candidates:       {} ({} skipped, {} failed)",
        summary.candidates_attempted, summary.skipped, summary.failed
    );
    println!("Retries:          {}", summary.stats.retries);
    println!(
        "Downloaded:       {:.2} MB in {:.1}s",
        summary.stats.bytes_downloaded as f64 / 1_048_576.0,
        summary.stats.elapsed_secs
    );
    println!("Budget remaining: {}", format_money(summary.budget_remaining));
    println!("Stopped:          {}", summary.termination);
    match metadata {
        Some(path) => println!("Metadata:         {}", path.display()),
        None => println!("Metadata:         none (no new images)"),
    }
}
