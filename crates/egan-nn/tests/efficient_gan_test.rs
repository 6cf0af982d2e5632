//! Integration tests for the Efficient-GAN fit / predict pipeline.
//!
//! Trains on small seeded Gaussian blobs and checks the scoring contract
//! end to end through the public API.

use candle_core::Device;
use egan_core::synthetic::{gaussian_blob, labeled_outlier_set, shell_points};
use egan_core::{EganError, FitConfig, ModelConfig, OptimizerConfig, ScoreConfig, BCE_EPSILON};
use egan_nn::EfficientGan;
use ndarray::Array2;

fn blob_fit_config(seed: u64) -> FitConfig {
    FitConfig {
        epochs: 200,
        batch_size: 32,
        optimizer: OptimizerConfig {
            learning_rate: 1e-4,
            ..OptimizerConfig::default()
        },
        verbose: false,
        seed,
        ..FitConfig::default()
    }
}

fn mean(values: &ndarray::Array1<f32>) -> f32 {
    values.sum() / values.len() as f32
}

/// Points far outside the training blob score higher than points inside it.
#[test]
fn far_points_score_higher_than_blob_points() {
    for seed in [1u64, 2, 3] {
        let train = gaussian_blob(100, &[0.0, 0.0], 0.5, seed).unwrap();
        let inside = gaussian_blob(30, &[0.0, 0.0], 0.25, seed + 100).unwrap();
        let outside = shell_points(30, &[0.0, 0.0], 6.0, seed + 200);

        let mut model = EfficientGan::new(ModelConfig::default(), Device::Cpu);
        model.fit(&train, &blob_fit_config(seed), None).unwrap();

        let inside_scores = model.predict(&inside, 0.9, 1.0).unwrap();
        let outside_scores = model.predict(&outside, 0.9, 1.0).unwrap();
        let (mi, mo) = (mean(&inside_scores), mean(&outside_scores));
        assert!(
            mo > mi,
            "seed {seed}: outside mean {mo} should exceed inside mean {mi}"
        );
    }
}

/// One score per input row, for any row count.
#[test]
fn predict_length_matches_input() {
    let train = gaussian_blob(50, &[1.0, 1.0, 1.0], 1.0, 7).unwrap();
    let mut model = EfficientGan::new(ModelConfig::default(), Device::Cpu);
    let config = FitConfig {
        epochs: 5,
        batch_size: 8,
        verbose: false,
        ..FitConfig::default()
    };
    model.fit(&train, &config, None).unwrap();

    for rows in [0usize, 1, 2, 17, 64] {
        let samples = Array2::from_elem((rows, 3), 0.5f32);
        assert_eq!(model.predict(&samples, 0.9, 1.0).unwrap().len(), rows);
    }
}

/// Score components respect their bounds on arbitrary inputs.
#[test]
fn score_components_bounded() {
    let train = gaussian_blob(50, &[0.0, 0.0], 1.0, 8).unwrap();
    let mut model = EfficientGan::new(ModelConfig::default(), Device::Cpu);
    let config = FitConfig {
        epochs: 20,
        batch_size: 16,
        verbose: false,
        ..FitConfig::default()
    };
    model.fit(&train, &config, None).unwrap();

    let probe = gaussian_blob(40, &[3.0, -3.0], 5.0, 9).unwrap();
    let scores = model
        .predict_detailed(&probe, &ScoreConfig::default())
        .unwrap();

    let lo = -(1.0 - BCE_EPSILON).ln();
    let hi = -BCE_EPSILON.ln();
    assert!(scores.generation.iter().all(|&g| g >= 0.0 && g.is_finite()));
    assert!(scores
        .discrimination
        .iter()
        .all(|&d| d >= lo - 1e-6 && d <= hi + 1e-3));
}

/// Weight 1 leaves only the generation score; weight 0 only the
/// discrimination score.
#[test]
fn weight_extremes_select_components() {
    let train = gaussian_blob(30, &[0.0, 0.0], 1.0, 10).unwrap();
    let mut model = EfficientGan::new(ModelConfig::default(), Device::Cpu);
    let config = FitConfig {
        epochs: 3,
        batch_size: 8,
        verbose: false,
        ..FitConfig::default()
    };
    model.fit(&train, &config, None).unwrap();

    let detail = model
        .predict_detailed(&train, &ScoreConfig::default())
        .unwrap();
    let only_gen = model.predict(&train, 1.0, 1.0).unwrap();
    let only_dis = model.predict(&train, 0.0, 1.0).unwrap();
    for i in 0..train.nrows() {
        assert!((only_gen[i] - detail.generation[i]).abs() < 1e-5);
        assert!((only_dis[i] - detail.discrimination[i]).abs() < 1e-5);
    }
}

/// Training with a labeled evaluation set records validation losses and
/// respects the epoch budget.
#[test]
fn evaluation_set_drives_validation_history() {
    let train = gaussian_blob(80, &[0.0, 0.0], 0.5, 11).unwrap();
    let eval = labeled_outlier_set(40, 10, &[0.0, 0.0], 0.5, 5.0, 12).unwrap();

    let mut model = EfficientGan::new(ModelConfig::default(), Device::Cpu);
    let config = FitConfig {
        epochs: 30,
        batch_size: 16,
        early_stop_patience: 5,
        verbose: false,
        ..FitConfig::default()
    };
    let report = model.fit(&train, &config, eval.eval_set()).unwrap();

    assert!(report.epochs_completed <= 30);
    assert_eq!(report.val_loss_history.len(), report.epochs_completed);
    assert!(report.min_val_loss.unwrap().is_finite());
    if report.stopped_early {
        assert!(report.epochs_completed > config.early_stop_patience);
    }
}

/// A degree of zero is rejected before any computation.
#[test]
fn invalid_degree_rejected() {
    let train = gaussian_blob(20, &[0.0], 1.0, 13).unwrap();
    let mut model = EfficientGan::new(ModelConfig::default(), Device::Cpu);
    let config = FitConfig {
        epochs: 1,
        batch_size: 4,
        verbose: false,
        ..FitConfig::default()
    };
    model.fit(&train, &config, None).unwrap();
    assert!(matches!(
        model.predict(&train, 0.9, 0.0),
        Err(EganError::InvalidArgument { .. })
    ));
}

/// Unnormalized features far from the origin saturate the discriminator's
/// logits; training and scoring must stay finite.
#[test]
fn large_magnitude_features_stay_finite() {
    let train = gaussian_blob(100, &[2000.0, -2000.0, 1500.0, -1500.0], 100.0, 13).unwrap();
    let mut model = EfficientGan::new(ModelConfig::default(), Device::Cpu);
    let config = FitConfig {
        epochs: 50,
        batch_size: 32,
        optimizer: OptimizerConfig {
            learning_rate: 1e-3,
            ..OptimizerConfig::default()
        },
        verbose: false,
        seed: 13,
        ..FitConfig::default()
    };
    let report = model.fit(&train, &config, None).unwrap();

    assert!(report.d_loss_history.iter().all(|l| l.is_finite()), "{:?}", report.d_loss_history);
    assert!(report.e_loss_history.iter().all(|l| l.is_finite()));
    assert!(report.g_loss_history.iter().all(|l| l.is_finite()));

    let scores = model.predict_detailed(&train, &ScoreConfig::default()).unwrap();
    assert!(scores.combined.iter().all(|s| s.is_finite()));
    assert!(scores.generation.iter().all(|&g| g >= 0.0));
    let hi = -BCE_EPSILON.ln() + 1e-3;
    assert!(scores.discrimination.iter().all(|&d| d.is_finite() && d <= hi));
}
