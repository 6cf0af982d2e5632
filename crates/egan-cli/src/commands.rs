//! Subcommand implementations.

use std::path::Path;
use std::time::Instant;

use candle_core::Device;
use egan_core::synthetic::{gaussian_blob, labeled_outlier_set};
use egan_core::{
    EganError, EganResult, FitConfig, LabeledSet, ModelConfig, OptimizerConfig, ScoreConfig,
};
use egan_nn::EfficientGan;
use tracing::info;

use crate::{DemoArgs, FitArgs, ScoreArgs};

fn device() -> Device {
    Device::cuda_if_available(0).unwrap_or(Device::Cpu)
}

fn load_fit_config(path: Option<&Path>) -> EganResult<FitConfig> {
    let Some(path) = path else {
        return Ok(FitConfig::default());
    };
    let json = std::fs::read_to_string(path).map_err(|e| EganError::Storage {
        message: format!("read {}: {e}", path.display()),
    })?;
    serde_json::from_str(&json).map_err(|e| EganError::InvalidConfig {
        message: format!("{}: {e}", path.display()),
    })
}

/// Applies command-line overrides on top of a file or default config.
fn resolve_fit_config(args: &FitArgs) -> EganResult<FitConfig> {
    let mut config = load_fit_config(args.config.as_deref())?;
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(lr) = args.lr {
        config.optimizer.learning_rate = lr;
    }
    if let Some(patience) = args.patience {
        config.early_stop_patience = patience;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.quiet {
        config.verbose = false;
    }
    config.validate()?;
    Ok(config)
}

pub(crate) fn fit(args: FitArgs) -> EganResult<()> {
    let config = resolve_fit_config(&args)?;
    let train = LabeledSet::from_file(&args.data)?;
    let eval = args.eval.as_deref().map(LabeledSet::from_file).transpose()?;
    let eval_set = match &eval {
        Some(set) => Some(set.eval_set().ok_or_else(|| EganError::InvalidArgument {
            message: "evaluation dataset must carry labels".to_string(),
        })?),
        None => None,
    };

    info!(
        train_rows = train.len(),
        features = train.feature_count(),
        eval_rows = eval.as_ref().map_or(0, LabeledSet::len),
        "loaded datasets"
    );

    let model_config = ModelConfig {
        input_dim: args.input_dim,
        latent_dim: args.latent_dim,
        ..ModelConfig::default()
    };
    let device = device();
    info!(device = ?device, "using device");

    let mut model = EfficientGan::new(model_config, device);
    let start = Instant::now();
    let report = model.fit(&train.samples, &config, eval_set)?;
    info!(
        epochs = report.epochs_completed,
        stopped_early = report.stopped_early,
        final_d_loss = ?report.final_d_loss(),
        min_val_loss = ?report.min_val_loss,
        seconds = start.elapsed().as_secs_f32(),
        "training complete"
    );

    model.save(&args.output)
}

pub(crate) fn score(args: ScoreArgs) -> EganResult<()> {
    let model = EfficientGan::load(&args.model, device())?;
    let data = LabeledSet::from_file(&args.data)?;
    let config = ScoreConfig {
        weight: args.weight,
        degree: args.degree,
    };
    let scores = model.predict(&data.samples, config.weight, config.degree)?;
    for s in &scores {
        println!("{s}");
    }
    info!(rows = scores.len(), "scored");
    Ok(())
}

pub(crate) fn demo(args: DemoArgs) -> EganResult<()> {
    let center = [0.0f32, 0.0];
    let train = gaussian_blob(args.points, &center, 0.5, args.seed)?;
    let holdout = labeled_outlier_set(50, 50, &center, 0.25, args.radius, args.seed.wrapping_add(1))?;
    let eval = holdout.eval_set().ok_or_else(|| EganError::Internal {
        message: "demo holdout set has no labels".to_string(),
    })?;

    let config = FitConfig {
        epochs: args.epochs,
        batch_size: 32,
        seed: args.seed,
        optimizer: OptimizerConfig {
            learning_rate: 1e-4,
            ..OptimizerConfig::default()
        },
        ..FitConfig::default()
    };

    let mut model = EfficientGan::new(ModelConfig::default(), device());
    let report = model.fit(&train, &config, Some(eval))?;

    let score_config = ScoreConfig::default();
    let scores = model.predict(&holdout.samples, score_config.weight, score_config.degree)?;
    let (mut inside, mut outside) = (Vec::new(), Vec::new());
    for (&s, &label) in scores.iter().zip(eval.labels.iter()) {
        if label > 0.5 {
            outside.push(s);
        } else {
            inside.push(s);
        }
    }
    let inside_mean = mean(&inside);
    let outside_mean = mean(&outside);

    println!("inlier mean score:  {inside_mean:.4}");
    println!("outlier mean score: {outside_mean:.4}");
    info!(
        epochs = report.epochs_completed,
        stopped_early = report.stopped_early,
        min_val_loss = ?report.min_val_loss,
        separated = outside_mean > inside_mean,
        "demo finished"
    );
    Ok(())
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return f32::NAN;
    }
    values.iter().sum::<f32>() / values.len() as f32
}
