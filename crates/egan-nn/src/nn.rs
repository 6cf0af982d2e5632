//! Shared layer primitives: initialized dense layers, activations and
//! ndarray ↔ tensor conversion.

use candle_core::{Device, Tensor};
use candle_nn::{Init, Linear, Module, VarBuilder};
use egan_core::{EganError, EganResult, WeightInit};
use ndarray::{Array1, Array2, ArrayView2};

/// Nonlinearity applied after a dense layer's affine map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Activation {
    Linear,
    Relu,
    LeakyRelu(f64),
    Sigmoid,
}

impl Activation {
    pub(crate) fn apply(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Self::Linear => Ok(xs.clone()),
            Self::Relu => xs.relu(),
            Self::LeakyRelu(slope) => candle_nn::ops::leaky_relu(xs, *slope),
            Self::Sigmoid => candle_nn::ops::sigmoid(xs),
        }
    }
}

/// Maps a kernel initializer to candle's init hint for a
/// `fan_in → fan_out` layer.
pub(crate) fn kernel_init(init: WeightInit, fan_in: usize, fan_out: usize) -> Init {
    let fan_in = fan_in.max(1) as f64;
    let fan_avg_sum = fan_in + fan_out.max(1) as f64;
    match init {
        WeightInit::GlorotUniform => {
            let limit = (6.0 / fan_avg_sum).sqrt();
            Init::Uniform {
                lo: -limit,
                up: limit,
            }
        }
        WeightInit::GlorotNormal => Init::Randn {
            mean: 0.0,
            stdev: (2.0 / fan_avg_sum).sqrt(),
        },
        WeightInit::HeUniform => {
            let limit = (6.0 / fan_in).sqrt();
            Init::Uniform {
                lo: -limit,
                up: limit,
            }
        }
        WeightInit::HeNormal => Init::Randn {
            mean: 0.0,
            stdev: (2.0 / fan_in).sqrt(),
        },
        WeightInit::Zeros => Init::Const(0.0),
    }
}

/// Fully connected layer with a fused activation.
#[derive(Debug, Clone)]
pub(crate) struct Dense {
    linear: Linear,
    activation: Activation,
    in_dim: usize,
    out_dim: usize,
}

impl Dense {
    /// Creates `weight` (`[out, in]`) and `bias` (`[out]`) under `vb`.
    pub(crate) fn new(
        in_dim: usize,
        out_dim: usize,
        activation: Activation,
        init: WeightInit,
        vb: VarBuilder,
    ) -> candle_core::Result<Self> {
        let weight = vb.get_with_hints(
            (out_dim, in_dim),
            "weight",
            kernel_init(init, in_dim, out_dim),
        )?;
        let bias = vb.get_with_hints(out_dim, "bias", Init::Const(0.0))?;
        Ok(Self {
            linear: Linear::new(weight, Some(bias)),
            activation,
            in_dim,
            out_dim,
        })
    }

    pub(crate) fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let h = self.linear.forward(xs)?;
        self.activation.apply(&h)
    }

    pub(crate) fn in_dim(&self) -> usize {
        self.in_dim
    }

    pub(crate) fn out_dim(&self) -> usize {
        self.out_dim
    }
}

/// Inverted dropout, active only when `train` is set.
pub(crate) fn dropout(xs: &Tensor, rate: f32, train: bool) -> candle_core::Result<Tensor> {
    if train && rate > 0.0 {
        candle_nn::ops::dropout(xs, rate)
    } else {
        Ok(xs.clone())
    }
}

/// Copies a row-major sample matrix onto `device` as an `[rows, cols]` f32 tensor.
pub(crate) fn array_to_tensor(array: ArrayView2<f32>, device: &Device) -> EganResult<Tensor> {
    let data: Vec<f32> = array.iter().copied().collect();
    Tensor::from_vec(data, array.dim(), device).map_err(|e| EganError::Internal {
        message: format!("array_to_tensor: {e}"),
    })
}

/// Pulls a 2-D tensor back into an ndarray matrix.
pub(crate) fn tensor_to_array2(tensor: &Tensor) -> EganResult<Array2<f32>> {
    let map_err = |e: candle_core::Error| EganError::Internal {
        message: format!("tensor_to_array2: {e}"),
    };
    let (rows, cols) = tensor.dims2().map_err(map_err)?;
    let data = tensor
        .flatten_all()
        .map_err(map_err)?
        .to_vec1::<f32>()
        .map_err(map_err)?;
    Array2::from_shape_vec((rows, cols), data).map_err(|e| EganError::Internal {
        message: format!("tensor_to_array2 reshape: {e}"),
    })
}

/// Flattens a `[rows, 1]` (or `[rows]`) tensor into an ndarray vector.
pub(crate) fn tensor_to_array1(tensor: &Tensor) -> EganResult<Array1<f32>> {
    let map_err = |e: candle_core::Error| EganError::Internal {
        message: format!("tensor_to_array1: {e}"),
    };
    let data = tensor
        .flatten_all()
        .map_err(map_err)?
        .to_vec1::<f32>()
        .map_err(map_err)?;
    Ok(Array1::from(data))
}
