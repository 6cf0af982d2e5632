//! Anomaly scoring.
//!
//! For each sample `x`:
//!
//! ```text
//! z           = E(x)
//! generation  = ‖x − G(z)‖_degree
//! discrimination = BCE(1, D(x, z))
//! score       = weight · generation + (1 − weight) · discrimination
//! ```
//!
//! A well-trained encoder/generator pair reconstructs in-distribution
//! samples closely, and the discriminator believes their (x, E(x)) pairs
//! are real, so both terms grow as a sample drifts away from the data.

use egan_core::numeric::{bce_against_one, row_norms};
use egan_core::{EganError, EganResult, ScoreConfig};
use ndarray::{Array1, Array2};

use crate::networks::Networks;
use crate::nn::{array_to_tensor, tensor_to_array1, tensor_to_array2};

/// Per-sample score components.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    /// Reconstruction residual norm. Non-negative.
    pub generation: Array1<f32>,
    /// Cross-entropy of the discriminator's belief against "real".
    pub discrimination: Array1<f32>,
    /// Weighted combination; higher is more anomalous.
    pub combined: Array1<f32>,
}

impl ScoreBreakdown {
    fn empty() -> Self {
        Self {
            generation: Array1::zeros(0),
            discrimination: Array1::zeros(0),
            combined: Array1::zeros(0),
        }
    }

    /// Number of scored samples.
    pub fn len(&self) -> usize {
        self.combined.len()
    }

    /// Returns `true` if no samples were scored.
    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }
}

/// Scores every row of `samples` with the networks in inference mode.
///
/// # Errors
///
/// Returns [`EganError::InvalidArgument`] for a non-finite weight or a
/// non-positive degree, [`EganError::ShapeMismatch`] if the column count
/// differs from the networks' input width, and [`EganError::Internal`] on
/// backend failures.
pub fn score(
    networks: &Networks,
    samples: &Array2<f32>,
    config: &ScoreConfig,
) -> EganResult<ScoreBreakdown> {
    if !config.weight.is_finite() {
        return Err(EganError::InvalidArgument {
            message: format!("score weight must be finite, got {}", config.weight),
        });
    }
    if config.degree.is_nan() || config.degree <= 0.0 {
        return Err(EganError::InvalidArgument {
            message: format!("norm degree must be positive, got {}", config.degree),
        });
    }
    if samples.ncols() != networks.input_dim() {
        return Err(EganError::ShapeMismatch {
            context: "score".to_string(),
            expected: networks.input_dim(),
            actual: samples.ncols(),
        });
    }
    if samples.nrows() == 0 {
        return Ok(ScoreBreakdown::empty());
    }

    let xs = array_to_tensor(samples.view(), networks.device())?;
    let zs = networks.encoder.forward(&xs)?;
    let reconstructed = tensor_to_array2(&networks.generator.forward(&zs)?)?;

    let residual = samples - &reconstructed;
    let generation = row_norms(residual.view(), config.degree)?;

    let probs = networks.discriminator.forward(&xs, &zs, false)?;
    let discrimination = tensor_to_array1(&probs)?.mapv(bce_against_one);

    let w = config.weight;
    let combined = &generation * w + &discrimination * (1.0 - w);

    Ok(ScoreBreakdown {
        generation,
        discrimination,
        combined,
    })
}
