//! # egan-nn
//!
//! Efficient-GAN anomaly detection on candle.
//!
//! Three small MLPs are trained jointly, BiGAN style:
//! - **Encoder** `E`: sample → latent code
//! - **Generator** `G`: latent code → sample
//! - **Discriminator** `D`: (sample, code) → probability the pair is real
//!
//! A sample's anomaly score mixes how badly `G(E(x))` reconstructs it with
//! how unconvinced `D` is by the pair `(x, E(x))`.
//!
//! ## Key Components
//!
//! - [`EfficientGan`]: fit / predict / save / load facade
//! - [`Networks`]: the three networks, each owning a `VarMap`
//! - [`graph::EncoderGraph`], [`graph::GeneratorGraph`]: composite graphs
//!   over the shared discriminator
//! - [`training::train_adversarial`]: the per-epoch schedule
//! - [`scoring::score`]: generation + discrimination scoring
//!
//! ## Architecture Rules
//!
//! - All candle code lives here; `egan-core` stays backend-free.
//! - Single-threaded and synchronous; the backend owns any parallelism.
//! - Freezing a network means not stepping its optimizer.

pub use egan_core;

mod loss;
mod nn;

pub mod discriminator;
pub mod encoder;
pub mod generator;
pub mod graph;
pub mod model;
pub mod networks;
pub mod scoring;
pub mod training;

pub use discriminator::Discriminator;
pub use encoder::Encoder;
pub use generator::Generator;
pub use model::EfficientGan;
pub use networks::Networks;
pub use scoring::ScoreBreakdown;
pub use training::{EarlyStopping, FitReport};

/// Hidden width of the encoder.
pub const ENCODER_HIDDEN: usize = 64;

/// Hidden widths of the generator, input side first.
pub const GENERATOR_HIDDEN: [usize; 2] = [64, 128];

/// Hidden width of every discriminator layer.
pub const DISCRIMINATOR_HIDDEN: usize = 128;

/// Dropout rate after each discriminator hidden layer.
pub const DISCRIMINATOR_DROPOUT: f32 = 0.2;

/// Negative slope of every leaky ReLU.
pub const LEAKY_SLOPE: f64 = 0.1;

/// Progress is logged on epochs divisible by this.
pub const PROGRESS_INTERVAL: usize = 10;
