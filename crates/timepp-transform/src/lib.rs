//! Preprocessing transforms for time-indexed tables.
//!
//! - [`Decomposer`]: classical and STL seasonal decomposition
//! - [`Encoder`]: label and one-hot encoding with persisted fitted state
//! - [`Normalizer`]: z-score scaling with persisted parameters
//! - [`fill_missing_time_steps`]: reindexing onto a regular time grid
//! - [`check_nan`]: per-column missing-value report

mod decompose;
mod encode;
mod error;
mod fill;
mod nan;
mod normalize;
mod persist;
mod series;

// Errors
pub use error::{Result, TransformError};

// Decomposition
pub use decompose::{
    COMPONENT_COLUMNS, Components, Decomposer, StlOptions, StlParams, classical_decompose,
    stl_decompose,
};

// Encoding and scaling
pub use encode::{CategoryCode, CategoryDtype, Encoder, FittedEncoding};
pub use normalize::{Normalizer, NormalizerParams};

// Time grid and missing values
pub use fill::{auto_fill_missing_time_steps, fill_between, fill_missing_time_steps};
pub use nan::{NanColumn, NanReport, check_nan, nan_report};
