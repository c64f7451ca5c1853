// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `pipeline` — builds the dataset and trains the model
//   2. `serve`    — loads the artifacts and serves the API
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use commands::{Commands, PipelineArgs, ServeArgs};

/// The main CLI struct
#[derive(Parser, Debug)]
#[command(
    name = "house-price-predictor",
    version = "0.1.0",
    about = "Train a random-forest house price model, then serve predictions over HTTP."
)]
pub struct Cli {
    /// The subcommand to run (pipeline or serve)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Pipeline(args) => run_pipeline(args),
            Commands::Serve(args)    => run_serve(args),
        }
    }
}

/// Handles the `pipeline` subcommand.
fn run_pipeline(args: PipelineArgs) -> Result<()> {
    use crate::application::pipeline_use_case::PipelineUseCase;

    tracing::info!("Starting pipeline on: {}", args.raw_csv.display());

    let report = PipelineUseCase::new(args.into()).execute()?;

    println!(
        "Pipeline complete: {} rows ({} cleaned + {} synthetic), R² = {:.4}, RMSE = ₹{:.0}",
        report.final_rows, report.cleaned_rows, report.synthetic_rows, report.r2, report.rmse,
    );
    println!("Dataset written to: {}", report.dataset_path.display());
    println!("Verification price: ₹{:.0}", report.verification_price);
    Ok(())
}

/// Handles the `serve` subcommand.
/// A failed artifact load is logged and the service still starts.
fn run_serve(args: ServeArgs) -> Result<()> {
    use crate::application::prediction_service::{PredictionService, APP_NAME, APP_VERSION};

    tracing::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let mut service = PredictionService::new(args.into());
    if service.load().is_ok() {
        tracing::info!("Model loaded successfully!");
    }

    let runtime = tokio::runtime::Runtime::new().context("Cannot start async runtime")?;
    runtime.block_on(crate::api::serve(Arc::new(service)))
}
