//! Error types shared by the timepp crates.

use std::fmt;

use thiserror::Error;

/// Broad category of a failure, shared by every timepp error type.
///
/// Callers that only care about *why* an operation was rejected can match on
/// the kind instead of the concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid parameter combination: unknown mode, missing frequency, absent column.
    Config,
    /// Operation invoked before the required `fit`.
    State,
    /// File access failure.
    Io,
    /// Malformed file or serialized content.
    Parse,
    /// Table contents cannot support the operation (missing values, wrong dtype).
    Data,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Config => "config",
            ErrorKind::State => "state",
            ErrorKind::Io => "io",
            ErrorKind::Parse => "parse",
            ErrorKind::Data => "data",
        };
        f.write_str(label)
    }
}

/// Errors raised while building or inspecting a [`Table`](crate::Table).
#[derive(Debug, Error)]
pub enum ModelError {
    // === Configuration Errors ===
    /// Column not found in the table.
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    /// String did not name a member of a closed enumeration.
    #[error("unknown {kind} '{value}' (expected one of: {expected})")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Frequency code could not be parsed.
    #[error("invalid frequency '{value}': {reason}")]
    InvalidFrequency { value: String, reason: &'static str },

    /// Operation needs a time index but the table has none.
    #[error("table has no time index")]
    MissingTimeIndex,

    // === Data Errors ===
    /// Index value could not be read as a timestamp.
    #[error("invalid timestamp '{value}' in column '{column}'")]
    InvalidTimestamp { column: String, value: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl ModelError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::ColumnNotFound { .. }
            | ModelError::UnknownVariant { .. }
            | ModelError::InvalidFrequency { .. }
            | ModelError::MissingTimeIndex => ErrorKind::Config,
            ModelError::InvalidTimestamp { .. } | ModelError::DataFrame { .. } => ErrorKind::Data,
        }
    }
}

impl From<polars::prelude::PolarsError> for ModelError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::ColumnNotFound {
            column: "sales".to_string(),
        };
        assert_eq!(err.to_string(), "column 'sales' not found");
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let model_err: ModelError = polars_err.into();
        assert!(matches!(model_err, ModelError::DataFrame { .. }));
        assert_eq!(model_err.kind(), ErrorKind::Data);
    }
}
