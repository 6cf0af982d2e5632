//! Error types for EGAN.

use thiserror::Error;

/// Root error type for all EGAN failures.
///
/// Framework failures (candle) are folded into [`EganError::Internal`]
/// with the failing operation named in the message.
///
/// # Example
///
/// ```
/// use egan_core::EganError;
///
/// let err = EganError::NotFitted;
/// assert_eq!(err.to_string(), "model has not been fitted or loaded");
/// ```
#[derive(Error, Debug)]
pub enum EganError {
    /// A training set with no rows was supplied.
    #[error("dataset is empty")]
    EmptyDataset,

    /// Data width or length does not match what the model expects.
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A configuration value is out of range.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// A call argument is out of range.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Scoring was requested before `fit` or `load`.
    #[error("model has not been fitted or loaded")]
    NotFitted,

    /// Reading or writing a checkpoint or dataset failed.
    #[error("storage error: {message}")]
    Storage { message: String },

    /// The tensor backend failed.
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Convenience alias used throughout the workspace.
pub type EganResult<T> = Result<T, EganError>;
