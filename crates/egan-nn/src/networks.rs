//! The three sub-networks and the variable maps that own their weights.

use std::path::Path;

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use egan_core::{EganError, EganResult, ModelConfig};

use crate::discriminator::Discriminator;
use crate::encoder::Encoder;
use crate::generator::Generator;
use crate::graph::{EncoderGraph, GeneratorGraph};

const ENCODER_FILE: &str = "encoder.safetensors";
const GENERATOR_FILE: &str = "generator.safetensors";
const DISCRIMINATOR_FILE: &str = "discriminator.safetensors";

/// Encoder, generator and discriminator, each backed by its own [`VarMap`].
///
/// Separate maps let an optimizer own exactly one network's parameters.
pub struct Networks {
    pub encoder: Encoder,
    pub generator: Generator,
    pub discriminator: Discriminator,
    pub encoder_vars: VarMap,
    pub generator_vars: VarMap,
    pub discriminator_vars: VarMap,
    device: Device,
}

impl std::fmt::Debug for Networks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Networks(E {}→{}, G {}→{}, D ({}, {})→1, device={:?})",
            self.encoder.input_dim(),
            self.encoder.latent_dim(),
            self.generator.latent_dim(),
            self.generator.output_dim(),
            self.discriminator.input_dim(),
            self.discriminator.latent_dim(),
            self.device
        )
    }
}

impl Networks {
    /// Builds freshly initialized networks for a resolved config.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::InvalidConfig`] if `input_dim` is still zero
    /// or `latent_dim` is zero, and [`EganError::Internal`] if parameter
    /// creation fails.
    pub fn build(config: &ModelConfig, device: &Device) -> EganResult<Self> {
        config.validate()?;
        if config.input_dim == 0 {
            return Err(EganError::InvalidConfig {
                message: "input_dim must be resolved before building networks".to_string(),
            });
        }

        let encoder_vars = VarMap::new();
        let generator_vars = VarMap::new();
        let discriminator_vars = VarMap::new();

        let encoder = Encoder::new(
            VarBuilder::from_varmap(&encoder_vars, DType::F32, device),
            config.input_dim,
            config.latent_dim,
            config.init,
        )?;
        let generator = Generator::new(
            VarBuilder::from_varmap(&generator_vars, DType::F32, device),
            config.latent_dim,
            config.input_dim,
            config.init,
        )?;
        let discriminator = Discriminator::new(
            VarBuilder::from_varmap(&discriminator_vars, DType::F32, device),
            config.input_dim,
            config.latent_dim,
            config.init,
        )?;

        Ok(Self {
            encoder,
            generator,
            discriminator,
            encoder_vars,
            generator_vars,
            discriminator_vars,
            device: device.clone(),
        })
    }

    /// Encoder → discriminator graph over the shared discriminator.
    pub fn encoder_graph(&self) -> EncoderGraph<'_> {
        EncoderGraph::new(&self.encoder, &self.discriminator)
    }

    /// Generator → discriminator graph over the shared discriminator.
    pub fn generator_graph(&self) -> GeneratorGraph<'_> {
        GeneratorGraph::new(&self.generator, &self.discriminator)
    }

    /// Device all weights live on.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Feature width the networks were built for.
    pub fn input_dim(&self) -> usize {
        self.encoder.input_dim()
    }

    /// Writes each network's weights as a safetensors file in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::Storage`] if a file cannot be written.
    pub fn save(&self, dir: &Path) -> EganResult<()> {
        for (vars, file) in [
            (&self.encoder_vars, ENCODER_FILE),
            (&self.generator_vars, GENERATOR_FILE),
            (&self.discriminator_vars, DISCRIMINATOR_FILE),
        ] {
            let path = dir.join(file);
            vars.save(&path).map_err(|e| EganError::Storage {
                message: format!("save {}: {e}", path.display()),
            })?;
        }
        Ok(())
    }

    /// Overwrites the current weights with those saved in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::Storage`] if a file is missing or its tensors
    /// do not match the built networks.
    pub fn load_weights(&mut self, dir: &Path) -> EganResult<()> {
        for (vars, file) in [
            (&mut self.encoder_vars, ENCODER_FILE),
            (&mut self.generator_vars, GENERATOR_FILE),
            (&mut self.discriminator_vars, DISCRIMINATOR_FILE),
        ] {
            let path = dir.join(file);
            vars.load(&path).map_err(|e| EganError::Storage {
                message: format!("load {}: {e}", path.display()),
            })?;
        }
        Ok(())
    }
}
