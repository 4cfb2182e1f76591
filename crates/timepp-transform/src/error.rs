//! Error types for preprocessing operations.

use std::path::PathBuf;

use thiserror::Error;
use timepp_model::{ErrorKind, ModelError};

/// Errors raised by decomposers, encoders, normalizers, the gap filler and
/// the NaN reporter.
#[derive(Debug, Error)]
pub enum TransformError {
    // === Configuration Errors ===
    /// Table-level failure (absent column, unknown option, bad index value).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Decomposition needs a period but none was given and the index has no frequency.
    #[error("no period given and the table index has no frequency")]
    MissingPeriod,

    /// Period unusable for decomposition.
    #[error("invalid period {period}: {reason}")]
    InvalidPeriod { period: usize, reason: &'static str },

    /// STL smoother length unusable.
    #[error("invalid {smoother} smoother length {length}: must be odd and at least 3")]
    InvalidSmoother {
        smoother: &'static str,
        length: usize,
    },

    /// Gap-fill bound is not a timestamp.
    #[error("invalid {bound} timestamp '{value}'")]
    InvalidBound { bound: &'static str, value: String },

    /// Gap-fill range is empty.
    #[error("start {start} is after end {end}")]
    EmptyRange { start: String, end: String },

    /// Category not seen during `fit`.
    #[error("category '{value}' was not seen when the encoder was fit")]
    UnknownCategory { value: String },

    /// Standard deviation is zero or undefined, so scaling would divide by zero.
    #[error("column '{column}' has zero or undefined standard deviation; cannot normalize")]
    ZeroVariance { column: String },

    // === State Errors ===
    /// Transform invoked before `fit`.
    #[error("{component} must be fit before calling {operation}")]
    NotFitted {
        component: &'static str,
        operation: &'static str,
    },

    // === Data Errors ===
    /// Column cannot be read as numbers.
    #[error("column '{column}' is not numeric (found {dtype})")]
    NonNumeric { column: String, dtype: String },

    /// Column holds nulls or NaN where complete data is required.
    #[error("column '{column}' has {count} missing values; decomposition needs a complete series")]
    MissingValues { column: String, count: usize },

    /// Multiplicative decomposition on values that are not strictly positive.
    #[error("column '{column}' has zero or negative values; multiplicative decomposition needs positive data")]
    NonPositiveValues { column: String },

    /// Series shorter than the decomposition needs.
    #[error("series has {actual} observations; at least {required} are needed")]
    SeriesTooShort { required: usize, actual: usize },

    /// Same timestamp appears on more than one row of the index.
    #[error("duplicate timestamp {value} in the time index")]
    DuplicateTimestamp { value: String },

    /// Encoded frame does not match the fitted encoding.
    #[error("encoded input does not match the fitted encoding: {reason}")]
    EncodedShape { reason: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    // === Persistence Errors ===
    /// Fitted state could not be written or read.
    #[error("failed to access {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Saved fitted state parses but breaks an invariant of the fitted type.
    #[error("invalid fitted state in {path}: {reason}")]
    InvalidFittedState { path: PathBuf, reason: String },

    /// Saved fitted state is malformed.
    #[error("invalid fitted state in {path}: {source}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TransformError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransformError::Model(err) => err.kind(),
            TransformError::MissingPeriod
            | TransformError::InvalidPeriod { .. }
            | TransformError::InvalidSmoother { .. }
            | TransformError::InvalidBound { .. }
            | TransformError::EmptyRange { .. }
            | TransformError::UnknownCategory { .. }
            | TransformError::ZeroVariance { .. } => ErrorKind::Config,
            TransformError::NotFitted { .. } => ErrorKind::State,
            TransformError::NonNumeric { .. }
            | TransformError::MissingValues { .. }
            | TransformError::NonPositiveValues { .. }
            | TransformError::SeriesTooShort { .. }
            | TransformError::DuplicateTimestamp { .. }
            | TransformError::EncodedShape { .. }
            | TransformError::DataFrame { .. } => ErrorKind::Data,
            TransformError::Persist { .. } => ErrorKind::Io,
            TransformError::Deserialize { .. } | TransformError::InvalidFittedState { .. } => {
                ErrorKind::Parse
            }
        }
    }
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for preprocessing operations.
pub type Result<T> = std::result::Result<T, TransformError>;
