//! Encoder network: feature vector → latent code.
//!
//! ```text
//! Input(input_dim) → Dense(64, LeakyReLU 0.1) → Dense(latent_dim, linear)
//! ```

use candle_core::Tensor;
use candle_nn::VarBuilder;
use egan_core::{EganError, EganResult, WeightInit};

use crate::nn::{Activation, Dense};
use crate::{ENCODER_HIDDEN, LEAKY_SLOPE};

/// Maps samples into latent space.
///
/// # Example
///
/// ```
/// use candle_core::{DType, Device, Tensor};
/// use candle_nn::{VarBuilder, VarMap};
/// use egan_core::WeightInit;
/// use egan_nn::Encoder;
///
/// let var_map = VarMap::new();
/// let vb = VarBuilder::from_varmap(&var_map, DType::F32, &Device::Cpu);
/// let encoder = Encoder::new(vb, 4, 8, WeightInit::GlorotUniform).unwrap();
///
/// let x = Tensor::zeros((3, 4), DType::F32, &Device::Cpu).unwrap();
/// assert_eq!(encoder.forward(&x).unwrap().dims(), &[3, 8]);
/// ```
#[derive(Debug, Clone)]
pub struct Encoder {
    hidden: Dense,
    out: Dense,
}

impl Encoder {
    /// Builds a freshly initialized encoder under `vb`.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::Internal`] if parameter creation fails.
    pub fn new(
        vb: VarBuilder,
        input_dim: usize,
        latent_dim: usize,
        init: WeightInit,
    ) -> EganResult<Self> {
        let map_err = |e: candle_core::Error| EganError::Internal {
            message: format!("Encoder new: {e}"),
        };

        let hidden = Dense::new(
            input_dim,
            ENCODER_HIDDEN,
            Activation::LeakyRelu(LEAKY_SLOPE),
            init,
            vb.pp("hidden"),
        )
        .map_err(map_err)?;
        let out = Dense::new(
            ENCODER_HIDDEN,
            latent_dim,
            Activation::Linear,
            init,
            vb.pp("out"),
        )
        .map_err(map_err)?;

        Ok(Self { hidden, out })
    }

    /// Encodes a `[N, input_dim]` batch into `[N, latent_dim]`.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::Internal`] if tensor operations fail.
    pub fn forward(&self, xs: &Tensor) -> EganResult<Tensor> {
        let map_err = |e: candle_core::Error| EganError::Internal {
            message: format!("Encoder forward: {e}"),
        };
        let h = self.hidden.forward(xs).map_err(map_err)?;
        self.out.forward(&h).map_err(map_err)
    }

    /// Feature width this encoder accepts.
    pub fn input_dim(&self) -> usize {
        self.hidden.in_dim()
    }

    /// Latent width this encoder produces.
    pub fn latent_dim(&self) -> usize {
        self.out.out_dim()
    }
}
