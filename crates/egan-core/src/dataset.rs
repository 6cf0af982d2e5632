//! Tabular datasets: a dense sample matrix with optional binary labels.
//!
//! On disk a dataset is a JSON object:
//!
//! ```json
//! { "samples": [[5.1, 3.5, 1.4, 0.2], [4.9, 3.0, 1.4, 0.2]], "labels": [0, 1] }
//! ```
//!
//! `labels` may be omitted for unlabeled training data.

use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{EganError, EganResult};

#[derive(Debug, Serialize, Deserialize)]
struct DatasetFile {
    samples: Vec<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    labels: Option<Vec<f32>>,
}

/// A sample matrix (`rows × features`) with optional per-row labels.
///
/// # Example
///
/// ```
/// use egan_core::LabeledSet;
///
/// let set = LabeledSet::from_json_str(r#"{"samples": [[1.0, 2.0], [3.0, 4.0]], "labels": [0, 1]}"#).unwrap();
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.feature_count(), 2);
/// assert!(set.eval_set().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSet {
    /// Feature matrix, one sample per row.
    pub samples: Array2<f32>,
    /// Binary labels (1 = anomaly), one per row, if known.
    pub labels: Option<Array1<f32>>,
}

impl LabeledSet {
    /// Wraps an unlabeled sample matrix.
    pub fn unlabeled(samples: Array2<f32>) -> Self {
        Self {
            samples,
            labels: None,
        }
    }

    /// Wraps a sample matrix and its labels.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::ShapeMismatch`] if label and row counts differ.
    pub fn labeled(samples: Array2<f32>, labels: Array1<f32>) -> EganResult<Self> {
        if samples.nrows() != labels.len() {
            return Err(EganError::ShapeMismatch {
                context: "labels".to_string(),
                expected: samples.nrows(),
                actual: labels.len(),
            });
        }
        Ok(Self {
            samples,
            labels: Some(labels),
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.nrows()
    }

    /// Returns `true` if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.nrows() == 0
    }

    /// Number of features per sample.
    pub fn feature_count(&self) -> usize {
        self.samples.ncols()
    }

    /// Borrows the set as an evaluation set, if it carries labels.
    pub fn eval_set(&self) -> Option<EvalSet<'_>> {
        self.labels.as_ref().map(|labels| EvalSet {
            samples: &self.samples,
            labels,
        })
    }

    /// Parses a dataset from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::Storage`] on malformed JSON and
    /// [`EganError::ShapeMismatch`] on ragged rows or a label count that
    /// differs from the row count.
    pub fn from_json_str(json: &str) -> EganResult<Self> {
        let file: DatasetFile = serde_json::from_str(json).map_err(|e| EganError::Storage {
            message: format!("dataset parse: {e}"),
        })?;

        let rows = file.samples.len();
        let cols = file.samples.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(rows * cols);
        for row in &file.samples {
            if row.len() != cols {
                return Err(EganError::ShapeMismatch {
                    context: "dataset row".to_string(),
                    expected: cols,
                    actual: row.len(),
                });
            }
            flat.extend_from_slice(row);
        }
        let samples = Array2::from_shape_vec((rows, cols), flat).map_err(|e| EganError::Internal {
            message: format!("dataset reshape: {e}"),
        })?;

        match file.labels {
            Some(labels) => Self::labeled(samples, Array1::from(labels)),
            None => Ok(Self::unlabeled(samples)),
        }
    }

    /// Reads a dataset from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::Storage`] if the file cannot be read, plus any
    /// error from [`LabeledSet::from_json_str`].
    pub fn from_file(path: &Path) -> EganResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| EganError::Storage {
            message: format!("read {}: {e}", path.display()),
        })?;
        Self::from_json_str(&json)
    }

    /// Serializes the dataset to its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::Storage`] if serialization fails.
    pub fn to_json_string(&self) -> EganResult<String> {
        let file = DatasetFile {
            samples: self.samples.rows().into_iter().map(|r| r.to_vec()).collect(),
            labels: self.labels.as_ref().map(|l| l.to_vec()),
        };
        serde_json::to_string(&file).map_err(|e| EganError::Storage {
            message: format!("dataset serialize: {e}"),
        })
    }

    /// Writes the dataset to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::Storage`] on serialization or I/O failure.
    pub fn save(&self, path: &Path) -> EganResult<()> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|e| EganError::Storage {
            message: format!("write {}: {e}", path.display()),
        })
    }
}

/// Held-out samples with binary labels, used for validation loss and
/// early stopping during training.
#[derive(Debug, Clone, Copy)]
pub struct EvalSet<'a> {
    /// Feature matrix, one sample per row.
    pub samples: &'a Array2<f32>,
    /// Binary labels, one per row.
    pub labels: &'a Array1<f32>,
}

impl<'a> EvalSet<'a> {
    /// Pairs samples with labels.
    ///
    /// # Errors
    ///
    /// Returns [`EganError::ShapeMismatch`] if label and row counts differ.
    pub fn new(samples: &'a Array2<f32>, labels: &'a Array1<f32>) -> EganResult<Self> {
        if samples.nrows() != labels.len() {
            return Err(EganError::ShapeMismatch {
                context: "eval labels".to_string(),
                expected: samples.nrows(),
                actual: labels.len(),
            });
        }
        Ok(Self { samples, labels })
    }
}
