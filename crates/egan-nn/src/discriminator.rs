//! Discriminator network: (sample, latent) pair → probability the pair is real.
//!
//! ```text
//! x ─ Dense(128, LeakyReLU) ─ Dropout(0.2) ─┐
//!                                           ├─ concat ─ Dense(128, LeakyReLU) ─ Dropout(0.2) ─ Dense(1, sigmoid)
//! z ─ Dense(128, LeakyReLU) ─ Dropout(0.2) ─┘
//! ```
//!
//! Dropout is only active when `train` is passed to [`Discriminator::forward`].

use candle_core::Tensor;
use candle_nn::VarBuilder;
use egan_core::{EganError, EganResult, WeightInit};

use crate::nn::{dropout, Activation, Dense};
use crate::{DISCRIMINATOR_DROPOUT, DISCRIMINATOR_HIDDEN, LEAKY_SLOPE};

/// Scores how "real" a (sample, latent) pair looks.
///
/// # Example
///
/// ```
/// use candle_core::{DType, Device, Tensor};
/// use candle_nn::{VarBuilder, VarMap};
/// use egan_core::WeightInit;
/// use egan_nn::Discriminator;
///
/// let var_map = VarMap::new();
/// let vb = VarBuilder::from_varmap(&var_map, DType::F32, &Device::Cpu);
/// let dis = Discriminator::new(vb, 4, 8, WeightInit::GlorotUniform).unwrap();
///
/// let x = Tensor::zeros((2, 4), DType::F32, &Device::Cpu).unwrap();
/// let z = Tensor::zeros((2, 8), DType::F32, &Device::Cpu).unwrap();
/// assert_eq!(dis.forward(&x, &z, false).unwrap().dims(), &[2, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct Discriminator {
    x_branch: Dense,
    z_branch: Dense,
    joint: Dense,
    out: Dense,
}

impl Discriminator {
    /// Builds a freshly initialized discriminator under `vb`.
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
            message: format!("Discriminator new: {e}"),
        };
        let leaky = Activation::LeakyRelu(LEAKY_SLOPE);

        let x_branch = Dense::new(input_dim, DISCRIMINATOR_HIDDEN, leaky, init, vb.pp("x_branch"))
            .map_err(map_err)?;
        let z_branch = Dense::new(latent_dim, DISCRIMINATOR_HIDDEN, leaky, init, vb.pp("z_branch"))
            .map_err(map_err)?;
        let joint = Dense::new(
            2 * DISCRIMINATOR_HIDDEN,
            DISCRIMINATOR_HIDDEN,
            leaky,
            init,
            vb.pp("joint"),
        )
        .map_err(map_err)?;
        let out = Dense::new(DISCRIMINATOR_HIDDEN, 1, Activation::Sigmoid, init, vb.pp("out"))
            .map_err(map_err)?;

        Ok(Self {
            x_branch,
            z_branch,
            joint,
            out,
        })
    }

    /// Returns `[N, 1]` probabilities for `[N, input_dim]` samples paired
    /// with `[N, latent_dim]` codes.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::Internal`] if tensor operations fail, including
    /// mismatched batch sizes between `xs` and `zs`.
    pub fn forward(&self, xs: &Tensor, zs: &Tensor, train: bool) -> EganResult<Tensor> {
        let map_err = |e: candle_core::Error| EganError::Internal {
            message: format!("Discriminator forward: {e}"),
        };

        let dx = self.x_branch.forward(xs).map_err(map_err)?;
        let dx = dropout(&dx, DISCRIMINATOR_DROPOUT, train).map_err(map_err)?;

        let dz = self.z_branch.forward(zs).map_err(map_err)?;
        let dz = dropout(&dz, DISCRIMINATOR_DROPOUT, train).map_err(map_err)?;

        let joined = Tensor::cat(&[&dx, &dz], 1).map_err(map_err)?;
        let h = self.joint.forward(&joined).map_err(map_err)?;
        let h = dropout(&h, DISCRIMINATOR_DROPOUT, train).map_err(map_err)?;
        self.out.forward(&h).map_err(map_err)
    }

    /// Feature width of the sample branch.
    pub fn input_dim(&self) -> usize {
        self.x_branch.in_dim()
    }

    /// Latent width of the code branch.
    pub fn latent_dim(&self) -> usize {
        self.z_branch.in_dim()
    }
}
