//! Array-level numeric helpers: min-max rescaling, row norms and
//! binary cross-entropy on plain `ndarray` data.
//!
//! These run outside the autograd graph, on scores and labels that have
//! already been pulled back from the tensor backend.

use ndarray::{Array1, ArrayView1, ArrayView2, Axis, Zip};

use crate::error::{EganError, EganResult};
use crate::BCE_EPSILON;

/// Linearly rescales `values` to `[0, 1]`.
///
/// A constant input maps to all zeros, matching scikit-learn's
/// `minmax_scale` which treats a zero range as a unit range.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use egan_core::numeric::min_max_scale;
///
/// let scaled = min_max_scale(array![2.0_f32, 4.0, 6.0].view());
/// assert_eq!(scaled, array![0.0, 0.5, 1.0]);
/// ```
pub fn min_max_scale(values: ArrayView1<f32>) -> Array1<f32> {
    if values.is_empty() {
        return Array1::zeros(0);
    }
    let min = values.fold(f32::INFINITY, |acc, &v| acc.min(v));
    let max = values.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
    let range = max - min;
    let range = if range == 0.0 { 1.0 } else { range };
    values.mapv(|v| (v - min) / range)
}

/// Computes the `degree`-norm of every row of `rows`.
///
/// `degree` may be any positive real; `f32::INFINITY` selects the
/// max-absolute-value norm.
///
/// # Errors
///
/// Returns [`EganError::InvalidArgument`] if `degree` is not positive.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use egan_core::numeric::row_norms;
///
/// let rows = array![[3.0_f32, -4.0], [0.0, 0.0]];
/// assert_eq!(row_norms(rows.view(), 1.0).unwrap(), array![7.0, 0.0]);
/// assert_eq!(row_norms(rows.view(), 2.0).unwrap(), array![5.0, 0.0]);
/// ```
pub fn row_norms(rows: ArrayView2<f32>, degree: f32) -> EganResult<Array1<f32>> {
    if degree.is_nan() || degree <= 0.0 {
        return Err(EganError::InvalidArgument {
            message: format!("norm degree must be positive, got {degree}"),
        });
    }

    let norms = rows.map_axis(Axis(1), |row| {
        if degree.is_infinite() {
            row.fold(0.0_f32, |acc, &v| acc.max(v.abs()))
        } else if degree == 1.0 {
            row.fold(0.0_f32, |acc, &v| acc + v.abs())
        } else if degree == 2.0 {
            row.fold(0.0_f32, |acc, &v| acc + v * v).sqrt()
        } else {
            row.fold(0.0_f32, |acc, &v| acc + v.abs().powf(degree))
                .powf(1.0 / degree)
        }
    });
    Ok(norms)
}

/// Per-element cross-entropy of probability `p` against the label 1.
///
/// `p` is clipped to `[ε, 1-ε]` first, so the result always lies in
/// `[-ln(1-ε), -ln(ε)]`.
pub fn bce_against_one(p: f32) -> f32 {
    -(p.clamp(BCE_EPSILON, 1.0 - BCE_EPSILON)).ln()
}

/// Mean binary cross-entropy between labels and predicted probabilities.
///
/// # Errors
///
/// Returns [`EganError::ShapeMismatch`] if the two arrays differ in length
/// and [`EganError::EmptyDataset`] if they are empty.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use egan_core::numeric::binary_cross_entropy;
///
/// let loss = binary_cross_entropy(array![1.0_f32, 0.0].view(), array![0.5, 0.5].view()).unwrap();
/// assert!((loss - std::f32::consts::LN_2).abs() < 1e-6);
/// ```
pub fn binary_cross_entropy(labels: ArrayView1<f32>, probs: ArrayView1<f32>) -> EganResult<f32> {
    if labels.len() != probs.len() {
        return Err(EganError::ShapeMismatch {
            context: "binary_cross_entropy".to_string(),
            expected: labels.len(),
            actual: probs.len(),
        });
    }
    if labels.is_empty() {
        return Err(EganError::EmptyDataset);
    }

    let mut total = 0.0_f64;
    Zip::from(&labels).and(&probs).for_each(|&y, &p| {
        let p = p.clamp(BCE_EPSILON, 1.0 - BCE_EPSILON);
        let term = y * p.ln() + (1.0 - y) * (1.0 - p).ln();
        total -= f64::from(term);
    });
    Ok((total / labels.len() as f64) as f32)
}
