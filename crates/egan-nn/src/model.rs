//! [`EfficientGan`]: the fit / predict facade over the three networks.

use std::path::Path;

use candle_core::Device;
use egan_core::{EganError, EganResult, EvalSet, FitConfig, ModelConfig, ScoreConfig};
use ndarray::{Array1, Array2};
use tracing::{debug, info};

use crate::networks::Networks;
use crate::scoring::{score, ScoreBreakdown};
use crate::training::{train_adversarial, FitReport};

const MODEL_CONFIG_FILE: &str = "model.json";

/// Efficient-GAN anomaly detector.
///
/// Networks are (re)built on every [`fit`](Self::fit); until then, or a
/// [`load`](Self::load), scoring returns [`EganError::NotFitted`].
///
/// # Example
///
/// ```
/// use candle_core::Device;
/// use egan_core::synthetic::gaussian_blob;
/// use egan_core::{FitConfig, ModelConfig};
/// use egan_nn::EfficientGan;
///
/// let data = gaussian_blob(40, &[0.0, 0.0], 1.0, 1).unwrap();
/// let mut model = EfficientGan::new(ModelConfig::default(), Device::Cpu);
/// let config = FitConfig { epochs: 5, batch_size: 8, verbose: false, ..FitConfig::default() };
///
/// model.fit(&data, &config, None).unwrap();
/// assert_eq!(model.input_dim(), 2);
///
/// let scores = model.predict(&data, 0.9, 1.0).unwrap();
/// assert_eq!(scores.len(), 40);
/// ```
pub struct EfficientGan {
    config: ModelConfig,
    device: Device,
    networks: Option<Networks>,
}

impl std::fmt::Debug for EfficientGan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EfficientGan")
            .field("config", &self.config)
            .field("networks", &self.networks)
            .finish()
    }
}

impl EfficientGan {
    /// Creates an unfitted model. `config.input_dim == 0` defers the
    /// feature width to the first `fit`.
    pub fn new(config: ModelConfig, device: Device) -> Self {
        Self {
            config,
            device,
            networks: None,
        }
    }

    /// Current model config (with `input_dim` resolved after a fit).
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Feature width; `0` until inferred.
    pub fn input_dim(&self) -> usize {
        self.config.input_dim
    }

    /// Returns `true` once networks exist.
    pub fn is_fitted(&self) -> bool {
        self.networks.is_some()
    }

    /// Borrows the trained networks.
    pub fn networks(&self) -> Option<&Networks> {
        self.networks.as_ref()
    }

    /// Builds fresh networks and trains them on `samples`.
    ///
    /// If the configured `input_dim` is below 1 it is taken from the
    /// column count of `samples` and kept for later calls.
    ///
    /// # Errors
    ///
    /// - [`EganError::EmptyDataset`] if `samples` has no rows
    /// - [`EganError::InvalidConfig`] if `config` or the model config is invalid
    /// - [`EganError::ShapeMismatch`] if training or evaluation columns
    ///   differ from `input_dim`
    /// - [`EganError::Internal`] if the backend fails mid-training
    pub fn fit(
        &mut self,
        samples: &Array2<f32>,
        config: &FitConfig,
        eval: Option<EvalSet<'_>>,
    ) -> EganResult<FitReport> {
        config.validate()?;
        self.config.validate()?;
        if samples.nrows() == 0 {
            return Err(EganError::EmptyDataset);
        }

        if self.config.input_dim < 1 {
            self.config.input_dim = samples.ncols();
            debug!(input_dim = self.config.input_dim, "inferred input_dim from training data");
        } else if samples.ncols() != self.config.input_dim {
            return Err(EganError::ShapeMismatch {
                context: "fit samples".to_string(),
                expected: self.config.input_dim,
                actual: samples.ncols(),
            });
        }
        if let Some(eval) = eval {
            if eval.samples.ncols() != self.config.input_dim {
                return Err(EganError::ShapeMismatch {
                    context: "fit eval samples".to_string(),
                    expected: self.config.input_dim,
                    actual: eval.samples.ncols(),
                });
            }
        }

        let networks = Networks::build(&self.config, &self.device)?;
        info!(
            rows = samples.nrows(),
            input_dim = self.config.input_dim,
            latent_dim = self.config.latent_dim,
            epochs = config.epochs,
            batch_size = config.batch_size,
            loss = config.loss.label(),
            "fitting efficient gan"
        );

        let report = train_adversarial(&networks, samples, config, eval)?;
        self.networks = Some(networks);
        Ok(report)
    }

    /// Anomaly score per row: `weight · generation + (1 − weight) · discrimination`.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::NotFitted`] before `fit`/`load`, plus any
    /// error from [`predict_detailed`](Self::predict_detailed).
    pub fn predict(&self, samples: &Array2<f32>, weight: f32, degree: f32) -> EganResult<Array1<f32>> {
        let config = ScoreConfig { weight, degree };
        Ok(self.predict_detailed(samples, &config)?.combined)
    }

    /// Like [`predict`](Self::predict) but keeps both score components.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::NotFitted`] before `fit`/`load`,
    /// [`EganError::InvalidArgument`] for a bad weight or degree and
    /// [`EganError::ShapeMismatch`] for the wrong column count.
    pub fn predict_detailed(
        &self,
        samples: &Array2<f32>,
        config: &ScoreConfig,
    ) -> EganResult<ScoreBreakdown> {
        let networks = self.networks.as_ref().ok_or(EganError::NotFitted)?;
        score(networks, samples, config)
    }

    /// Writes the model config and all weights into `dir`, creating it
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::NotFitted`] for an untrained model and
    /// [`EganError::Storage`] on I/O failure.
    pub fn save(&self, dir: &Path) -> EganResult<()> {
        let networks = self.networks.as_ref().ok_or(EganError::NotFitted)?;
        std::fs::create_dir_all(dir).map_err(|e| EganError::Storage {
            message: format!("create {}: {e}", dir.display()),
        })?;

        let json = serde_json::to_string_pretty(&self.config).map_err(|e| EganError::Storage {
            message: format!("serialize model config: {e}"),
        })?;
        let config_path = dir.join(MODEL_CONFIG_FILE);
        std::fs::write(&config_path, json).map_err(|e| EganError::Storage {
            message: format!("write {}: {e}", config_path.display()),
        })?;

        networks.save(dir)?;
        info!(dir = %dir.display(), "saved model");
        Ok(())
    }

    /// Restores a model written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns [`EganError::Storage`] if files are missing or malformed.
    pub fn load(dir: &Path, device: Device) -> EganResult<Self> {
        let config_path = dir.join(MODEL_CONFIG_FILE);
        let json = std::fs::read_to_string(&config_path).map_err(|e| EganError::Storage {
            message: format!("read {}: {e}", config_path.display()),
        })?;
        let config: ModelConfig = serde_json::from_str(&json).map_err(|e| EganError::Storage {
            message: format!("parse {}: {e}", config_path.display()),
        })?;

        let mut networks = Networks::build(&config, &device)?;
        networks.load_weights(dir)?;
        debug!(dir = %dir.display(), input_dim = config.input_dim, "loaded model");

        Ok(Self {
            config,
            device,
            networks: Some(networks),
        })
    }
}
