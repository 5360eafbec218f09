//! Error types for marrow.
//!
//! All input-shape and configuration problems are reported through [`MatError`]
//! before any computation starts. Degenerate medial geometry is never an error:
//! it shows up as NaN-bearing descriptor fields instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MatError`].
pub type Result<T> = std::result::Result<T, MatError>;

/// Errors that can occur while computing descriptors or segmenting a medial axis.
#[derive(Error, Debug)]
pub enum MatError {
    /// An input array does not have the length implied by the surface point count.
    #[error("{what} has {actual} entries, expected {expected}")]
    InputShapeMismatch {
        /// Name of the offending input.
        what: &'static str,
        /// The expected length.
        expected: usize,
        /// The actual length.
        actual: usize,
    },

    /// A feature index points outside the surface point set.
    #[error("feature index {index} at position {position} is out of range for {len} points")]
    IndexOutOfRange {
        /// Position of the entry in the feature index array.
        position: usize,
        /// The invalid index.
        index: usize,
        /// Number of surface points.
        len: usize,
    },

    /// The region growing criterion selector is not recognized.
    #[error("unsupported region growing method: {0}")]
    UnsupportedMethod(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading data from a file.
    #[error("failed to load {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving data to a file.
    #[error("failed to save {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },
}

impl MatError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MatError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a shape mismatch error for `what`.
    pub(crate) fn shape(what: &'static str, expected: usize, actual: usize) -> Self {
        MatError::InputShapeMismatch {
            what,
            expected,
            actual,
        }
    }
}
