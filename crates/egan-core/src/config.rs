//! Model, training and scoring configuration.
//!
//! All structs have sensible [`Default`] impls and round-trip through
//! serde so the CLI can read them from JSON files.

use serde::{Deserialize, Serialize};

use crate::error::{EganError, EganResult};
use crate::{DEFAULT_LATENT_DIM, DEFAULT_SCORE_DEGREE, DEFAULT_SCORE_WEIGHT};

/// Kernel initializer for every dense layer.
///
/// Biases always start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    /// Uniform in `±sqrt(6 / (fan_in + fan_out))`.
    #[default]
    GlorotUniform,
    /// Normal with `std = sqrt(2 / (fan_in + fan_out))`.
    GlorotNormal,
    /// Uniform in `±sqrt(6 / fan_in)`.
    HeUniform,
    /// Normal with `std = sqrt(2 / fan_in)`.
    HeNormal,
    /// All zeros. Only useful in tests.
    Zeros,
}

/// Loss applied to the discriminator's probability output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    /// Binary cross-entropy with predictions clipped to `[ε, 1-ε]`.
    #[default]
    BinaryCrossEntropy,
    /// Mean squared error between probability and label.
    MeanSquaredError,
}

impl Loss {
    /// Returns a short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BinaryCrossEntropy => "bce",
            Self::MeanSquaredError => "mse",
        }
    }
}

/// Network hyperparameters.
///
/// # Example
///
/// ```
/// use egan_core::ModelConfig;
///
/// let config = ModelConfig::default();
/// assert_eq!(config.input_dim, 0);
/// assert_eq!(config.latent_dim, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Feature count. `0` means "infer from the training data".
    pub input_dim: usize,

    /// Latent code width (default: 32).
    pub latent_dim: usize,

    /// Kernel initializer (default: Glorot uniform).
    pub init: WeightInit,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            input_dim: 0,
            latent_dim: DEFAULT_LATENT_DIM,
            init: WeightInit::default(),
        }
    }
}

impl ModelConfig {
    /// Creates a config with an explicit input width.
    pub fn with_input_dim(input_dim: usize) -> Self {
        Self {
            input_dim,
            ..Self::default()
        }
    }

    /// Checks the config for values the networks cannot be built from.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::InvalidConfig`] if `latent_dim` is zero.
    pub fn validate(&self) -> EganResult<()> {
        if self.latent_dim == 0 {
            return Err(EganError::InvalidConfig {
                message: "latent_dim must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Adam-family optimizer parameters, shared by all three networks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Step size (default: 1e-5).
    pub learning_rate: f64,
    /// First-moment decay (default: 0.5).
    pub beta1: f64,
    /// Second-moment decay (default: 0.999).
    pub beta2: f64,
    /// Numerical stabilizer (default: 1e-7).
    pub eps: f64,
    /// Decoupled weight decay. `0.0` gives plain Adam (default).
    pub weight_decay: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-5,
            beta1: 0.5,
            beta2: 0.999,
            eps: 1e-7,
            weight_decay: 0.0,
        }
    }
}

/// Training loop parameters.
///
/// # Example
///
/// ```
/// use egan_core::FitConfig;
///
/// let config = FitConfig::default();
/// assert_eq!(config.epochs, 50);
/// assert_eq!(config.batch_size, 64);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Number of epochs; each epoch is one step per network (default: 50).
    pub epochs: usize,

    /// Half of this is drawn as real rows per epoch (default: 64).
    pub batch_size: usize,

    /// Loss for all three networks.
    pub loss: Loss,

    /// Optimizer parameters.
    pub optimizer: OptimizerConfig,

    /// Non-improving validation epochs tolerated before stopping (default: 50).
    pub early_stop_patience: usize,

    /// Log progress at `info` instead of `debug` (default: true).
    pub verbose: bool,

    /// Seed for batch and latent sampling (default: 42).
    pub seed: u64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 64,
            loss: Loss::default(),
            optimizer: OptimizerConfig::default(),
            early_stop_patience: 50,
            verbose: true,
            seed: 42,
        }
    }
}

impl FitConfig {
    /// Number of real rows (and latent codes) drawn per epoch.
    pub fn half_batch(&self) -> usize {
        self.batch_size / 2
    }

    /// Checks the config for values the training loop cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::InvalidConfig`] if the batch is smaller than two
    /// or the learning rate is not a positive finite number.
    pub fn validate(&self) -> EganResult<()> {
        if self.half_batch() == 0 {
            return Err(EganError::InvalidConfig {
                message: format!("batch_size must be at least 2, got {}", self.batch_size),
            });
        }
        let lr = self.optimizer.learning_rate;
        if !(lr.is_finite() && lr > 0.0) {
            return Err(EganError::InvalidConfig {
                message: format!("learning_rate must be positive, got {lr}"),
            });
        }
        Ok(())
    }
}

/// Weighting of the two score components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Share of the generation score (default: 0.9).
    pub weight: f32,
    /// Norm degree for the reconstruction residual (default: 1).
    pub degree: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            weight: DEFAULT_SCORE_WEIGHT,
            degree: DEFAULT_SCORE_DEGREE,
        }
    }
}
