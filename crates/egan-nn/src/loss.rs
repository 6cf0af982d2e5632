//! Differentiable losses on discriminator probabilities.

use candle_core::{DType, Device, Tensor};
use egan_core::{Loss, BCE_EPSILON};

/// Computes the scalar `loss` between `[N, 1]` probabilities and targets.
pub(crate) fn compute(loss: Loss, probs: &Tensor, targets: &Tensor) -> candle_core::Result<Tensor> {
    match loss {
        Loss::BinaryCrossEntropy => binary_cross_entropy(probs, targets),
        Loss::MeanSquaredError => candle_nn::loss::mse(probs, targets),
    }
}

/// Mean binary cross-entropy with probabilities clipped to `[ε, 1-ε]`.
pub(crate) fn binary_cross_entropy(probs: &Tensor, targets: &Tensor) -> candle_core::Result<Tensor> {
    let eps = f64::from(BCE_EPSILON);
    let p = probs.clamp(eps, 1.0 - eps)?;
    let log_p = p.log()?;
    let log_not_p = p.affine(-1.0, 1.0)?.log()?;
    let not_targets = targets.affine(-1.0, 1.0)?;
    let ll = ((targets * &log_p)? + (&not_targets * &log_not_p)?)?;
    ll.neg()?.mean_all()
}

/// `[n, 1]` tensor of a constant label.
pub(crate) fn labels(n: usize, real: bool, device: &Device) -> candle_core::Result<Tensor> {
    if real {
        Tensor::ones((n, 1), DType::F32, device)
    } else {
        Tensor::zeros((n, 1), DType::F32, device)
    }
}
