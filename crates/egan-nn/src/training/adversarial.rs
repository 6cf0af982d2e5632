//! Joint adversarial training of encoder, generator and discriminator.
//!
//! ## Algorithm
//!
//! Per epoch:
//! 1. Draw `batch_size / 2` real rows uniformly with replacement
//! 2. Draw as many latent codes `z ~ N(0, I)`; `x_gen = G(z)`
//! 3. Encode the real rows: `z_enc = E(x_real)`
//! 4. One discriminator step on `(x_real, z_enc) → 1`, one on `(x_gen, z) → 0`
//! 5. Freeze the discriminator
//! 6. One encoder step through `D(x, E(x))` toward label 0
//! 7. One generator step through `D(G(z), z)` toward label 1
//! 8. With an evaluation set: score it, min-max rescale, take BCE against
//!    the labels as validation loss and feed it to early stopping
//!
//! The encoder is pushed toward label 0 while the discriminator learns to
//! call encoded pairs 1; this is the scheme's established convention and
//! is kept as-is.

use candle_core::{Device, Tensor};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarMap};
use egan_core::numeric::{binary_cross_entropy, min_max_scale};
use egan_core::{
    EganError, EganResult, EvalSet, FitConfig, OptimizerConfig, ScoreConfig,
};
use ndarray::{Array2, Axis};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::loss;
use crate::networks::Networks;
use crate::nn::array_to_tensor;
use crate::scoring::score;
use crate::training::early_stop::EarlyStopping;
use crate::PROGRESS_INTERVAL;

/// Outcome of one call to [`train_adversarial`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitReport {
    /// Epochs fully trained (including the one that triggered a stop).
    pub epochs_completed: usize,

    /// Whether early stopping ended training before `epochs`.
    pub stopped_early: bool,

    /// Discriminator loss per epoch (real step + fake step).
    pub d_loss_history: Vec<f32>,

    /// Encoder loss per epoch.
    pub e_loss_history: Vec<f32>,

    /// Generator loss per epoch.
    pub g_loss_history: Vec<f32>,

    /// Validation loss per epoch; empty without an evaluation set.
    pub val_loss_history: Vec<f32>,

    /// Best validation loss, if an evaluation set was supplied.
    pub min_val_loss: Option<f32>,
}

impl FitReport {
    /// Last recorded discriminator loss.
    pub fn final_d_loss(&self) -> Option<f32> {
        self.d_loss_history.last().copied()
    }
}

/// The three losses of one epoch.
#[derive(Debug, Clone, Copy)]
struct EpochLosses {
    d: f32,
    e: f32,
    g: f32,
}

fn adam(vars: &VarMap, config: &OptimizerConfig) -> candle_core::Result<AdamW> {
    AdamW::new(
        vars.all_vars(),
        ParamsAdamW {
            lr: config.learning_rate,
            beta1: config.beta1,
            beta2: config.beta2,
            eps: config.eps,
            weight_decay: config.weight_decay,
        },
    )
}

/// Runs the adversarial training loop on already-built networks.
///
/// `samples` must have `networks.input_dim()` columns; the caller
/// validates shapes and configs.
///
/// # Errors
///
/// Returns [`EganError::EmptyDataset`] if `samples` has no rows and
/// [`EganError::Internal`] if any forward or optimizer step fails.
pub fn train_adversarial(
    networks: &Networks,
    samples: &Array2<f32>,
    config: &FitConfig,
    eval: Option<EvalSet<'_>>,
) -> EganResult<FitReport> {
    if samples.nrows() == 0 {
        return Err(EganError::EmptyDataset);
    }

    let map_err = |e: candle_core::Error| EganError::Internal {
        message: format!("train_adversarial: {e}"),
    };

    let device = networks.device();
    let half = config.half_batch();
    let latent_dim = networks.generator.latent_dim();

    let mut dis_opt = adam(&networks.discriminator_vars, &config.optimizer).map_err(map_err)?;
    let mut enc_opt = adam(&networks.encoder_vars, &config.optimizer).map_err(map_err)?;
    let mut gen_opt = adam(&networks.generator_vars, &config.optimizer).map_err(map_err)?;

    let labels = BatchLabels::new(half, device).map_err(map_err)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut stopper = EarlyStopping::new(config.early_stop_patience);
    let mut report = FitReport {
        d_loss_history: Vec::with_capacity(config.epochs),
        e_loss_history: Vec::with_capacity(config.epochs),
        g_loss_history: Vec::with_capacity(config.epochs),
        ..FitReport::default()
    };

    for epoch in 0..config.epochs {
        // Batch assembly
        let idx: Vec<usize> = (0..half).map(|_| rng.gen_range(0..samples.nrows())).collect();
        let real = array_to_tensor(samples.select(Axis(0), &idx).view(), device)?;
        let noise: Array2<f32> = Array2::random_using((half, latent_dim), StandardNormal, &mut rng);
        let noise = array_to_tensor(noise.view(), device)?;

        let generated = networks.generator.forward(&noise)?.detach();
        let encoded = networks.encoder.forward(&real)?.detach();

        // Discriminator
        let d_real = networks.discriminator.forward(&real, &encoded, true)?;
        let d_real_loss = loss::compute(config.loss, &d_real, &labels.real).map_err(map_err)?;
        dis_opt.backward_step(&d_real_loss).map_err(map_err)?;

        let d_fake = networks.discriminator.forward(&generated, &noise, true)?;
        let d_fake_loss = loss::compute(config.loss, &d_fake, &labels.fake).map_err(map_err)?;
        dis_opt.backward_step(&d_fake_loss).map_err(map_err)?;

        let (e_loss, g_loss) = step_encoder_and_generator(
            networks,
            (&real, &noise),
            &labels,
            config,
            &mut enc_opt,
            &mut gen_opt,
        )?;

        let losses = EpochLosses {
            d: scalar(&d_real_loss)? + scalar(&d_fake_loss)?,
            e: e_loss,
            g: g_loss,
        };
        report.d_loss_history.push(losses.d);
        report.e_loss_history.push(losses.e);
        report.g_loss_history.push(losses.g);
        report.epochs_completed = epoch + 1;

        let mut val_loss = None;
        if let Some(eval) = eval {
            let current = validation_loss(networks, eval)?;
            report.val_loss_history.push(current);
            val_loss = Some(current);

            if stopper.observe(current) {
                report.stopped_early = true;
                warn!(
                    epoch,
                    min_val_loss = stopper.min_loss(),
                    patience = config.early_stop_patience,
                    "validation loss stalled, stopping early"
                );
                break;
            }
        }

        if epoch % PROGRESS_INTERVAL == 0 {
            log_progress(config.verbose, epoch, losses, val_loss);
        }
    }

    if eval.is_some() {
        report.min_val_loss = Some(stopper.min_loss());
    }
    Ok(report)
}

/// Constant `[half, 1]` targets shared by every epoch.
struct BatchLabels {
    real: Tensor,
    fake: Tensor,
}

impl BatchLabels {
    fn new(half: usize, device: &Device) -> candle_core::Result<Self> {
        Ok(Self {
            real: loss::labels(half, true, device)?,
            fake: loss::labels(half, false, device)?,
        })
    }
}

/// One encoder step (toward label 0) and one generator step (toward
/// label 1) through the shared discriminator. Only `enc_opt` and
/// `gen_opt` step, so the discriminator weights are left untouched.
///
/// Returns the encoder and generator losses.
fn step_encoder_and_generator(
    networks: &Networks,
    (real, noise): (&Tensor, &Tensor),
    labels: &BatchLabels,
    config: &FitConfig,
    enc_opt: &mut AdamW,
    gen_opt: &mut AdamW,
) -> EganResult<(f32, f32)> {
    let map_err = |e: candle_core::Error| EganError::Internal {
        message: format!("step_encoder_and_generator: {e}"),
    };

    let e_probs = networks.encoder_graph().forward(real, true)?;
    let e_loss = loss::compute(config.loss, &e_probs, &labels.fake).map_err(map_err)?;
    enc_opt.backward_step(&e_loss).map_err(map_err)?;

    let g_probs = networks.generator_graph().forward(noise, true)?;
    let g_loss = loss::compute(config.loss, &g_probs, &labels.real).map_err(map_err)?;
    gen_opt.backward_step(&g_loss).map_err(map_err)?;

    Ok((scalar(&e_loss)?, scalar(&g_loss)?))
}

/// Min-max rescaled anomaly scores vs. labels, as binary cross-entropy.
fn validation_loss(networks: &Networks, eval: EvalSet<'_>) -> EganResult<f32> {
    let scores = score(networks, eval.samples, &ScoreConfig::default())?;
    let proba = min_max_scale(scores.combined.view());
    binary_cross_entropy(eval.labels.view(), proba.view())
}

fn scalar(t: &Tensor) -> EganResult<f32> {
    t.to_vec0::<f32>().map_err(|e| EganError::Internal {
        message: format!("train_adversarial loss readback: {e}"),
    })
}

fn log_progress(verbose: bool, epoch: usize, losses: EpochLosses, val_loss: Option<f32>) {
    if verbose {
        info!(
            epoch,
            d_loss = losses.d,
            e_loss = losses.e,
            g_loss = losses.g,
            val_loss = ?val_loss,
            "training progress"
        );
    } else {
        debug!(
            epoch,
            d_loss = losses.d,
            e_loss = losses.e,
            g_loss = losses.g,
            val_loss = ?val_loss,
            "training progress"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egan_core::synthetic::{gaussian_blob, labeled_outlier_set};
    use egan_core::ModelConfig;

    fn small_fit_config() -> FitConfig {
        FitConfig {
            epochs: 20,
            batch_size: 16,
            verbose: false,
            ..FitConfig::default()
        }
    }

    fn var_snapshot(vars: &VarMap) -> Vec<Vec<f32>> {
        let data = vars.data().lock().unwrap();
        let mut names: Vec<&String> = data.keys().collect();
        names.sort();
        names
            .iter()
            .map(|n| {
                data[*n]
                    .as_tensor()
                    .flatten_all()
                    .unwrap()
                    .to_vec1::<f32>()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn runs_all_epochs_without_eval() {
        let nets = Networks::build(&ModelConfig::with_input_dim(2), &Device::Cpu).unwrap();
        let data = gaussian_blob(50, &[0.0, 0.0], 1.0, 1).unwrap();
        let report = train_adversarial(&nets, &data, &small_fit_config(), None).unwrap();

        assert_eq!(report.epochs_completed, 20);
        assert!(!report.stopped_early);
        assert_eq!(report.d_loss_history.len(), 20);
        assert_eq!(report.e_loss_history.len(), 20);
        assert_eq!(report.g_loss_history.len(), 20);
        assert!(report.val_loss_history.is_empty());
        assert!(report.min_val_loss.is_none());
        assert!(report.d_loss_history.iter().all(|l| l.is_finite()));
    }

    #[test]
    fn every_network_is_updated() {
        let nets = Networks::build(&ModelConfig::with_input_dim(3), &Device::Cpu).unwrap();
        let before = (
            var_snapshot(&nets.encoder_vars),
            var_snapshot(&nets.generator_vars),
            var_snapshot(&nets.discriminator_vars),
        );
        let data = gaussian_blob(40, &[1.0, 2.0, 3.0], 0.5, 2).unwrap();
        let config = FitConfig {
            epochs: 3,
            optimizer: OptimizerConfig {
                learning_rate: 1e-3,
                ..OptimizerConfig::default()
            },
            ..small_fit_config()
        };
        train_adversarial(&nets, &data, &config, None).unwrap();

        assert_ne!(before.0, var_snapshot(&nets.encoder_vars));
        assert_ne!(before.1, var_snapshot(&nets.generator_vars));
        assert_ne!(before.2, var_snapshot(&nets.discriminator_vars));
    }

    #[test]
    fn zero_epochs_is_a_no_op() {
        let nets = Networks::build(&ModelConfig::with_input_dim(2), &Device::Cpu).unwrap();
        let data = gaussian_blob(10, &[0.0, 0.0], 1.0, 1).unwrap();
        let config = FitConfig {
            epochs: 0,
            ..small_fit_config()
        };
        let report = train_adversarial(&nets, &data, &config, None).unwrap();
        assert_eq!(report.epochs_completed, 0);
        assert!(report.d_loss_history.is_empty());
    }

    #[test]
    fn eval_set_tracks_validation_loss() {
        let nets = Networks::build(&ModelConfig::with_input_dim(2), &Device::Cpu).unwrap();
        let train = gaussian_blob(60, &[0.0, 0.0], 1.0, 3).unwrap();
        let eval = labeled_outlier_set(20, 5, &[0.0, 0.0], 1.0, 8.0, 4).unwrap();
        let report =
            train_adversarial(&nets, &train, &small_fit_config(), eval.eval_set()).unwrap();

        assert_eq!(report.val_loss_history.len(), report.epochs_completed);
        let min = report.min_val_loss.unwrap();
        let observed_min = report
            .val_loss_history
            .iter()
            .copied()
            .fold(f32::INFINITY, f32::min);
        assert_eq!(min, observed_min);
    }

    #[test]
    fn zero_patience_stops_on_second_epoch() {
        // identical eval rows give constant scores, so the validation
        // loss never improves after the first epoch
        let nets = Networks::build(&ModelConfig::with_input_dim(2), &Device::Cpu).unwrap();
        let train = gaussian_blob(30, &[0.0, 0.0], 1.0, 5).unwrap();
        let samples = Array2::<f32>::zeros((4, 2));
        let labels = ndarray::Array1::<f32>::zeros(4);
        let eval = EvalSet::new(&samples, &labels).unwrap();
        let config = FitConfig {
            epochs: 10,
            early_stop_patience: 0,
            ..small_fit_config()
        };
        let report = train_adversarial(&nets, &train, &config, Some(eval)).unwrap();
        assert!(report.stopped_early);
        assert_eq!(report.epochs_completed, 2);
    }

    #[test]
    fn patience_counts_stalled_epochs() {
        let nets = Networks::build(&ModelConfig::with_input_dim(2), &Device::Cpu).unwrap();
        let train = gaussian_blob(30, &[0.0, 0.0], 1.0, 8).unwrap();
        let samples = Array2::<f32>::zeros((5, 2));
        let labels = ndarray::Array1::<f32>::zeros(5);
        let eval = EvalSet::new(&samples, &labels).unwrap();
        let config = FitConfig {
            epochs: 50,
            early_stop_patience: 3,
            ..small_fit_config()
        };
        let report = train_adversarial(&nets, &train, &config, Some(eval)).unwrap();

        // first epoch sets the minimum, then three stalls
        assert!(report.stopped_early);
        assert_eq!(report.epochs_completed, config.early_stop_patience + 1);
        assert_eq!(report.val_loss_history.len(), 4);
        assert_eq!(report.d_loss_history.len(), 4);
    }

    struct StepFixture {
        nets: Networks,
        real: Tensor,
        noise: Tensor,
        labels: BatchLabels,
        config: FitConfig,
    }

    fn step_fixture() -> StepFixture {
        let device = Device::Cpu;
        let nets = Networks::build(&ModelConfig::with_input_dim(3), &device).unwrap();
        let data = gaussian_blob(16, &[1.0, 2.0, 3.0], 0.5, 6).unwrap();
        let real = array_to_tensor(data.view(), &device).unwrap();
        let noise = Tensor::randn(0f32, 1.0, (16, nets.generator.latent_dim()), &device).unwrap();
        let labels = BatchLabels::new(16, &device).unwrap();
        let config = FitConfig {
            optimizer: OptimizerConfig {
                learning_rate: 5e-3,
                ..OptimizerConfig::default()
            },
            ..small_fit_config()
        };
        StepFixture {
            nets,
            real,
            noise,
            labels,
            config,
        }
    }

    #[test]
    fn discriminator_frozen_during_encoder_and_generator_steps() {
        let f = step_fixture();
        let mut enc_opt = adam(&f.nets.encoder_vars, &f.config.optimizer).unwrap();
        let mut gen_opt = adam(&f.nets.generator_vars, &f.config.optimizer).unwrap();
        let dis_before = var_snapshot(&f.nets.discriminator_vars);
        let enc_before = var_snapshot(&f.nets.encoder_vars);
        let gen_before = var_snapshot(&f.nets.generator_vars);

        for _ in 0..5 {
            step_encoder_and_generator(
                &f.nets,
                (&f.real, &f.noise),
                &f.labels,
                &f.config,
                &mut enc_opt,
                &mut gen_opt,
            )
            .unwrap();
        }

        assert_eq!(dis_before, var_snapshot(&f.nets.discriminator_vars));
        assert_ne!(enc_before, var_snapshot(&f.nets.encoder_vars));
        assert_ne!(gen_before, var_snapshot(&f.nets.generator_vars));
    }

    #[test]
    fn encoder_steps_lower_discriminator_belief() {
        let f = step_fixture();
        let mut enc_opt = adam(&f.nets.encoder_vars, &f.config.optimizer).unwrap();
        let mut gen_opt = adam(&f.nets.generator_vars, &f.config.optimizer).unwrap();
        let mean_belief = |nets: &Networks| {
            nets.encoder_graph()
                .forward(&f.real, false)
                .unwrap()
                .mean_all()
                .unwrap()
                .to_vec0::<f32>()
                .unwrap()
        };

        let before = mean_belief(&f.nets);
        for _ in 0..20 {
            step_encoder_and_generator(
                &f.nets,
                (&f.real, &f.noise),
                &f.labels,
                &f.config,
                &mut enc_opt,
                &mut gen_opt,
            )
            .unwrap();
        }
        let after = mean_belief(&f.nets);

        // encoder target is 0, so D(x, E(x)) must drop
        assert!(after < before, "before {before}, after {after}");
    }

    #[test]
    fn empty_samples_error() {
        let nets = Networks::build(&ModelConfig::with_input_dim(2), &Device::Cpu).unwrap();
        let data = Array2::<f32>::zeros((0, 2));
        assert!(matches!(
            train_adversarial(&nets, &data, &small_fit_config(), None),
            Err(EganError::EmptyDataset)
        ));
    }
}
