//! Generator network: latent code → reconstructed feature vector.
//!
//! ```text
//! Latent(latent_dim) → Dense(64, ReLU) → Dense(128, ReLU) → Dense(input_dim, linear)
//! ```

use candle_core::Tensor;
use candle_nn::VarBuilder;
use egan_core::{EganError, EganResult, WeightInit};

use crate::nn::{Activation, Dense};
use crate::GENERATOR_HIDDEN;

/// Decodes latent codes back into feature space.
#[derive(Debug, Clone)]
pub struct Generator {
    hidden: Vec<Dense>,
    out: Dense,
    latent_dim: usize,
}

impl Generator {
    /// Builds a freshly initialized generator under `vb`.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::Internal`] if parameter creation fails.
    pub fn new(
        vb: VarBuilder,
        latent_dim: usize,
        output_dim: usize,
        init: WeightInit,
    ) -> EganResult<Self> {
        let map_err = |e: candle_core::Error| EganError::Internal {
            message: format!("Generator new: {e}"),
        };

        let mut hidden = Vec::with_capacity(GENERATOR_HIDDEN.len());
        let mut width = latent_dim;
        for (i, &units) in GENERATOR_HIDDEN.iter().enumerate() {
            let layer = Dense::new(
                width,
                units,
                Activation::Relu,
                init,
                vb.pp(format!("hidden_{i}")),
            )
            .map_err(map_err)?;
            hidden.push(layer);
            width = units;
        }
        let out = Dense::new(width, output_dim, Activation::Linear, init, vb.pp("out"))
            .map_err(map_err)?;

        Ok(Self {
            hidden,
            out,
            latent_dim,
        })
    }

    /// Decodes a `[N, latent_dim]` batch into `[N, output_dim]`.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::Internal`] if tensor operations fail.
    pub fn forward(&self, zs: &Tensor) -> EganResult<Tensor> {
        let map_err = |e: candle_core::Error| EganError::Internal {
            message: format!("Generator forward: {e}"),
        };
        let mut h = zs.clone();
        for layer in &self.hidden {
            h = layer.forward(&h).map_err(map_err)?;
        }
        self.out.forward(&h).map_err(map_err)
    }

    /// Latent width this generator accepts.
    pub fn latent_dim(&self) -> usize {
        self.latent_dim
    }

    /// Feature width this generator produces.
    pub fn output_dim(&self) -> usize {
        self.out.out_dim()
    }
}
