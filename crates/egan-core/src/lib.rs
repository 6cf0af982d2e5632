//! # egan-core
//!
//! Shared foundation for the EGAN anomaly detector.
//!
//! ## Key Components
//!
//! - [`EganError`] / [`EganResult`]: error taxonomy for every crate
//! - [`ModelConfig`], [`FitConfig`], [`ScoreConfig`]: serde-ready configuration
//! - [`LabeledSet`], [`EvalSet`]: tabular samples with optional binary labels
//! - [`numeric`]: min-max rescaling, row norms, binary cross-entropy
//! - [`synthetic`]: seeded Gaussian blobs and outlier shells
//!
//! ## Architecture Rules
//!
//! - No tensor-backend code here; candle lives in `egan-nn`.
//! - No logging; callers decide what to report.

pub mod config;
pub mod dataset;
pub mod error;
pub mod numeric;
pub mod synthetic;

pub use config::{FitConfig, Loss, ModelConfig, OptimizerConfig, ScoreConfig, WeightInit};
pub use dataset::{EvalSet, LabeledSet};
pub use error::{EganError, EganResult};

/// Default latent code width.
pub const DEFAULT_LATENT_DIM: usize = 32;

/// Default share of the generation score in the combined anomaly score.
pub const DEFAULT_SCORE_WEIGHT: f32 = 0.9;

/// Default norm degree for the reconstruction residual.
pub const DEFAULT_SCORE_DEGREE: f32 = 1.0;

/// Probabilities are clipped to `[BCE_EPSILON, 1 - BCE_EPSILON]` before
/// taking logarithms.
pub const BCE_EPSILON: f32 = 1e-7;
