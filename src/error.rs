//! Error types for numr-random

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using numr-random's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while sampling
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Parameter shapes cannot be broadcast into the requested output shape
    #[error("Shape mismatch: cannot broadcast {shape:?} into {target:?}")]
    ShapeMismatch {
        /// Offending shape
        shape: Vec<usize>,
        /// Requested output shape
        target: Vec<usize>,
    },

    /// A structurally required parameter is out of its domain
    #[error("Invalid parameter '{arg}': {reason}")]
    InvalidParameter {
        /// The parameter name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Generator seed outside the accepted range
    #[error("Invalid seed {seed}: seeds must be non-negative")]
    InvalidSeed {
        /// The rejected seed
        seed: i64,
    },

    /// Unsupported dtype for a distribution
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// No distribution is registered under this name
    #[error("Unknown distribution '{name}'")]
    UnknownDistribution {
        /// The requested name
        name: String,
    },

    /// Multi-index does not address an element of the tensor
    #[error("Index {index:?} out of bounds for shape {shape:?}")]
    IndexOutOfBounds {
        /// The invalid multi-index
        index: Vec<usize>,
        /// Shape of the tensor
        shape: Vec<usize>,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(shape: &[usize], target: &[usize]) -> Self {
        Self::ShapeMismatch {
            shape: shape.to_vec(),
            target: target.to_vec(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }
}
