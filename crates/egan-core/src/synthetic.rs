//! Seeded synthetic datasets for tests, benches and the demo command.

use ndarray::{concatenate, Array1, Array2, ArrayView1, Axis};
use ndarray_rand::rand_distr::{Normal, StandardNormal};
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::dataset::LabeledSet;
use crate::error::{EganError, EganResult};

/// Draws `n` points from an isotropic Gaussian around `center`.
///
/// # Errors
///
/// Returns [`EganError::InvalidArgument`] if `std` is negative or not finite.
///
/// # Example
///
/// ```
/// use egan_core::synthetic::gaussian_blob;
///
/// let blob = gaussian_blob(100, &[0.0, 0.0], 0.5, 7).unwrap();
/// assert_eq!(blob.dim(), (100, 2));
/// ```
pub fn gaussian_blob(n: usize, center: &[f32], std: f32, seed: u64) -> EganResult<Array2<f32>> {
    let normal = Normal::new(0.0_f32, std).map_err(|e| EganError::InvalidArgument {
        message: format!("gaussian_blob std={std}: {e}"),
    })?;
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Array2::random_using((n, center.len()), normal, &mut rng);
    Ok(noise + &ArrayView1::from(center))
}

/// Draws `n` points at distance `radius` from `center` in random
/// directions.
pub fn shell_points(n: usize, center: &[f32], radius: f32, seed: u64) -> Array2<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut dirs: Array2<f32> = Array2::random_using((n, center.len()), StandardNormal, &mut rng);
    for mut row in dirs.rows_mut() {
        let norm = row.dot(&row).sqrt().max(f32::EPSILON);
        row.mapv_inplace(|v| v / norm * radius);
    }
    dirs + &ArrayView1::from(center)
}

/// Builds a labeled set of `n_inliers` blob points (label 0) followed by
/// `n_outliers` points on a shell of `outlier_radius` (label 1).
///
/// # Errors
///
/// Propagates errors from [`gaussian_blob`].
///
/// # Example
///
/// ```
/// use egan_core::synthetic::labeled_outlier_set;
///
/// let set = labeled_outlier_set(20, 5, &[1.0, -1.0], 0.3, 6.0, 11).unwrap();
/// assert_eq!(set.len(), 25);
/// let labels = set.labels.unwrap();
/// assert_eq!(labels.sum(), 5.0);
/// ```
pub fn labeled_outlier_set(
    n_inliers: usize,
    n_outliers: usize,
    center: &[f32],
    std: f32,
    outlier_radius: f32,
    seed: u64,
) -> EganResult<LabeledSet> {
    let inliers = gaussian_blob(n_inliers, center, std, seed)?;
    let outliers = shell_points(n_outliers, center, outlier_radius, seed.wrapping_add(1));
    let samples = concatenate(Axis(0), &[inliers.view(), outliers.view()]).map_err(|e| {
        EganError::Internal {
            message: format!("labeled_outlier_set concat: {e}"),
        }
    })?;

    let mut labels: Array1<f32> = Array1::zeros(n_inliers + n_outliers);
    labels.slice_mut(ndarray::s![n_inliers..]).fill(1.0);
    LabeledSet::labeled(samples, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_is_deterministic_per_seed() {
        let a = gaussian_blob(10, &[0.0, 1.0], 1.0, 3).unwrap();
        let b = gaussian_blob(10, &[0.0, 1.0], 1.0, 3).unwrap();
        let c = gaussian_blob(10, &[0.0, 1.0], 1.0, 4).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn blob_centered_on_center() {
        let blob = gaussian_blob(2000, &[5.0, -3.0], 0.5, 9).unwrap();
        let mean = blob.mean_axis(Axis(0)).unwrap();
        assert!((mean[0] - 5.0).abs() < 0.1);
        assert!((mean[1] + 3.0).abs() < 0.1);
    }

    #[test]
    fn negative_std_rejected() {
        assert!(gaussian_blob(3, &[0.0], -1.0, 0).is_err());
    }

    #[test]
    fn shell_points_lie_on_radius() {
        let pts = shell_points(50, &[1.0, 1.0], 4.0, 5);
        for row in pts.rows() {
            let d = ((row[0] - 1.0).powi(2) + (row[1] - 1.0).powi(2)).sqrt();
            assert!((d - 4.0).abs() < 1e-3, "distance {d}");
        }
    }
}
