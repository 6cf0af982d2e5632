//! Composite training graphs.
//!
//! Both graphs borrow the one [`Discriminator`]; its weights are shared,
//! never copied. Which network a graph trains is decided by which
//! optimizer is stepped on its loss, so the discriminator stays frozen
//! while these graphs are optimized.

use candle_core::Tensor;
use egan_core::EganResult;

use crate::discriminator::Discriminator;
use crate::encoder::Encoder;
use crate::generator::Generator;

/// `x ↦ D(x, E(x))`, used to train the encoder.
#[derive(Debug, Clone, Copy)]
pub struct EncoderGraph<'a> {
    encoder: &'a Encoder,
    discriminator: &'a Discriminator,
}

impl<'a> EncoderGraph<'a> {
    pub fn new(encoder: &'a Encoder, discriminator: &'a Discriminator) -> Self {
        Self {
            encoder,
            discriminator,
        }
    }

    /// Returns `[N, 1]` discriminator probabilities for real samples
    /// paired with their own encodings.
    pub fn forward(&self, xs: &Tensor, train: bool) -> EganResult<Tensor> {
        let zs = self.encoder.forward(xs)?;
        self.discriminator.forward(xs, &zs, train)
    }
}

/// `z ↦ D(G(z), z)`, used to train the generator.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorGraph<'a> {
    generator: &'a Generator,
    discriminator: &'a Discriminator,
}

impl<'a> GeneratorGraph<'a> {
    pub fn new(generator: &'a Generator, discriminator: &'a Discriminator) -> Self {
        Self {
            generator,
            discriminator,
        }
    }

    /// Returns `[N, 1]` discriminator probabilities for generated samples
    /// paired with the codes that produced them.
    pub fn forward(&self, zs: &Tensor, train: bool) -> EganResult<Tensor> {
        let xs = self.generator.forward(zs)?;
        self.discriminator.forward(&xs, zs, train)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::{VarBuilder, VarMap};
    use egan_core::WeightInit;

    #[test]
    fn graphs_share_the_discriminator() {
        let device = Device::Cpu;
        let (enc_vars, gen_vars, dis_vars) = (VarMap::new(), VarMap::new(), VarMap::new());
        let encoder = Encoder::new(
            VarBuilder::from_varmap(&enc_vars, DType::F32, &device),
            3,
            2,
            WeightInit::GlorotUniform,
        )
        .unwrap();
        let generator = Generator::new(
            VarBuilder::from_varmap(&gen_vars, DType::F32, &device),
            2,
            3,
            WeightInit::GlorotUniform,
        )
        .unwrap();
        let dis = Discriminator::new(
            VarBuilder::from_varmap(&dis_vars, DType::F32, &device),
            3,
            2,
            WeightInit::GlorotUniform,
        )
        .unwrap();

        let x = Tensor::randn(0f32, 1.0, (5, 3), &device).unwrap();
        let z = encoder.forward(&x).unwrap();

        let via_graph = EncoderGraph::new(&encoder, &dis).forward(&x, false).unwrap();
        let direct = dis.forward(&x, &z, false).unwrap();
        assert_eq!(
            via_graph.to_vec2::<f32>().unwrap(),
            direct.to_vec2::<f32>().unwrap()
        );

        // mutating the discriminator's vars is visible through the graph
        for var in dis_vars.all_vars() {
            var.set(&var.zeros_like().unwrap()).unwrap();
        }
        let p = GeneratorGraph::new(&generator, &dis).forward(&z, false).unwrap();
        let v = p.flatten_all().unwrap().to_vec1::<f32>().unwrap();
        assert!(v.iter().all(|&p| (p - 0.5).abs() < 1e-6));
    }
}
