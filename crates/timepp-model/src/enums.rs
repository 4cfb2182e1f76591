//! Closed enumerations for preprocessing configuration.
//!
//! Every option that the toolkit accepts as a string on the outside is parsed
//! into one of these enums up front, so an invalid value is rejected when the
//! component is configured rather than deep inside a transform.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// How seasonal and trend components combine in a classical decomposition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecomposeMode {
    /// `y = seasonal + trend + residual`
    #[default]
    Additive,
    /// `y = seasonal * trend * residual`
    Multiplicative,
}

impl DecomposeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecomposeMode::Additive => "additive",
            DecomposeMode::Multiplicative => "multiplicative",
        }
    }
}

impl fmt::Display for DecomposeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecomposeMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "additive" | "add" => Ok(DecomposeMode::Additive),
            "multiplicative" | "mul" => Ok(DecomposeMode::Multiplicative),
            _ => Err(ModelError::UnknownVariant {
                kind: "decomposition mode",
                value: s.to_string(),
                expected: "additive, multiplicative",
            }),
        }
    }
}

/// Categorical encoding scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingKind {
    /// One indicator column per category.
    #[default]
    OneHot,
    /// A single integer code per category.
    Label,
}

impl EncodingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingKind::OneHot => "onehot",
            EncodingKind::Label => "label",
        }
    }
}

impl fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodingKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "onehot" => Ok(EncodingKind::OneHot),
            "label" => Ok(EncodingKind::Label),
            _ => Err(ModelError::UnknownVariant {
                kind: "encoder type",
                value: s.to_string(),
                expected: "onehot, label",
            }),
        }
    }
}

/// What a decomposition returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentOutput {
    /// A new table holding the index column (if any) and the three components.
    #[default]
    ComponentsOnly,
    /// A copy of the source table with the three components appended.
    /// The source table itself is never modified.
    AppendToCopy,
}

/// Behavior of one-hot encoding for a category not seen during `fit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    /// Fail the transform.
    #[default]
    Error,
    /// Encode as the all-zero indicator vector.
    Ignore,
}

impl FromStr for HandleUnknown {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(HandleUnknown::Error),
            "ignore" => Ok(HandleUnknown::Ignore),
            _ => Err(ModelError::UnknownVariant {
                kind: "unknown-category policy",
                value: s.to_string(),
                expected: "error, ignore",
            }),
        }
    }
}
