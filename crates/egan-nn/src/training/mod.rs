//! Efficient-GAN training.
//!
//! [`train_adversarial`] runs the per-epoch discriminator / encoder /
//! generator schedule on a set of [`Networks`](crate::Networks);
//! [`EarlyStopping`] decides when validation loss has stalled.

pub mod adversarial;
pub mod early_stop;

pub use adversarial::{train_adversarial, FitReport};
pub use early_stop::EarlyStopping;
