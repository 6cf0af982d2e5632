//! `egan` — train and apply Efficient-GAN anomaly detectors.
//!
//! # Usage
//!
//! ```bash
//! # Train on unlabeled rows, validating against a labeled set
//! egan fit --data train.json --eval eval.json --output models/egan --epochs 500
//!
//! # Score new rows (one score per line on stdout)
//! egan score --model models/egan --data new.json
//!
//! # Self-contained run on a synthetic 2-D blob
//! egan demo --points 100 --epochs 300
//! ```
//!
//! Datasets are JSON: `{"samples": [[...], ...], "labels": [...]}`.
//! Set `RUST_LOG=debug` for per-epoch detail.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "egan", version, about = "Efficient-GAN anomaly detection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Train a model and save it to a directory.
    Fit(FitArgs),
    /// Score samples with a saved model.
    Score(ScoreArgs),
    /// Train on a synthetic blob and compare inlier vs outlier scores.
    Demo(DemoArgs),
}

#[derive(Debug, Args)]
struct FitArgs {
    /// Training dataset (JSON).
    #[arg(long)]
    data: PathBuf,

    /// Labeled evaluation dataset for validation loss / early stopping.
    #[arg(long)]
    eval: Option<PathBuf>,

    /// Output directory for the trained model.
    #[arg(long)]
    output: PathBuf,

    /// JSON file with a full training config; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    batch_size: Option<usize>,

    /// Adam learning rate.
    #[arg(long)]
    lr: Option<f64>,

    /// Early-stopping patience in epochs.
    #[arg(long)]
    patience: Option<usize>,

    /// Latent code width.
    #[arg(long, default_value_t = egan_core::DEFAULT_LATENT_DIM)]
    latent_dim: usize,

    /// Feature count; 0 infers it from the data.
    #[arg(long, default_value_t = 0)]
    input_dim: usize,

    #[arg(long)]
    seed: Option<u64>,

    /// Log progress at debug level only.
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Args)]
struct ScoreArgs {
    /// Directory written by `egan fit`.
    #[arg(long)]
    model: PathBuf,

    /// Dataset to score (JSON).
    #[arg(long)]
    data: PathBuf,

    /// Share of the reconstruction score.
    #[arg(long, default_value_t = egan_core::DEFAULT_SCORE_WEIGHT)]
    weight: f32,

    /// Norm degree for the reconstruction residual.
    #[arg(long, default_value_t = egan_core::DEFAULT_SCORE_DEGREE)]
    degree: f32,
}

#[derive(Debug, Args)]
struct DemoArgs {
    /// Training points in the blob.
    #[arg(long, default_value_t = 100)]
    points: usize,

    #[arg(long, default_value_t = 300)]
    epochs: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Distance of the outlier shell from the blob center.
    #[arg(long, default_value_t = 6.0)]
    radius: f32,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Fit(args) => commands::fit(args),
        Command::Score(args) => commands::score(args),
        Command::Demo(args) => commands::demo(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
