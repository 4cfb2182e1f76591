//! Categorical encoding: label codes and one-hot indicator columns.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use timepp_model::{EncodingKind, HandleUnknown, Table};

use crate::error::{Result, TransformError};
use crate::persist::{load_json, save_json};

/// Code assigned to a category by a fitted encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryCode {
    Label(i64),
    OneHot(Vec<u8>),
}

/// Value type of a fitted column, restored by [`FittedEncoding::inverse_transform`].
///
/// Columns of any other type are encoded through their string form and
/// decode to strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryDtype {
    #[default]
    String,
    Boolean,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl CategoryDtype {
    fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::Boolean => Self::Boolean,
            DataType::Int32 => Self::Int32,
            DataType::Int64 => Self::Int64,
            DataType::UInt32 => Self::UInt32,
            DataType::UInt64 => Self::UInt64,
            DataType::Float32 => Self::Float32,
            DataType::Float64 => Self::Float64,
            _ => Self::String,
        }
    }

    pub fn data_type(self) -> DataType {
        match self {
            Self::String => DataType::String,
            Self::Boolean => DataType::Boolean,
            Self::Int32 => DataType::Int32,
            Self::Int64 => DataType::Int64,
            Self::UInt32 => DataType::UInt32,
            Self::UInt64 => DataType::UInt64,
            Self::Float32 => DataType::Float32,
            Self::Float64 => DataType::Float64,
        }
    }
}

/// Categories learned by [`Encoder::fit`].
///
/// Categories are the distinct non-null values of the fitted column sorted
/// by value (numbers numerically, text lexically) and stored in their string
/// form. A label code is the position of the category in that order; a
/// one-hot vector has a single `1` at that position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedEncoding {
    kind: EncodingKind,
    column: String,
    categories: Vec<String>,
    #[serde(default)]
    dtype: CategoryDtype,
    handle_unknown: HandleUnknown,
}

impl FittedEncoding {
    pub fn fit(series: &Series, kind: EncodingKind, handle_unknown: HandleUnknown) -> Result<Self> {
        let dtype = CategoryDtype::of(series.dtype());
        Ok(Self {
            kind,
            column: series.name().to_string(),
            categories: sorted_categories(series, dtype)?,
            dtype,
            handle_unknown,
        })
    }

    pub fn kind(&self) -> EncodingKind {
        self.kind
    }

    /// Name of the column the encoding was learned from.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn handle_unknown(&self) -> HandleUnknown {
        self.handle_unknown
    }

    pub fn dtype(&self) -> CategoryDtype {
        self.dtype
    }

    /// Position of `value` (in string form) among the learned categories.
    pub fn code_of(&self, value: &str) -> Option<usize> {
        self.categories.iter().position(|category| category == value)
    }

    /// One-hot output column names, in category order.
    pub fn indicator_columns(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|category| format!("{}_{}", self.column, category))
            .collect()
    }

    pub fn mapping(&self) -> BTreeMap<String, CategoryCode> {
        self.categories
            .iter()
            .enumerate()
            .map(|(code, category)| {
                let encoded = match self.kind {
                    EncodingKind::Label => CategoryCode::Label(code as i64),
                    EncodingKind::OneHot => {
                        let mut indicator = vec![0u8; self.categories.len()];
                        indicator[code] = 1;
                        CategoryCode::OneHot(indicator)
                    }
                };
                (category.clone(), encoded)
            })
            .collect()
    }

    /// Encodes `series`.
    ///
    /// Label encoding yields one `Int64` column named like the input, with
    /// nulls kept. One-hot encoding yields one `Int32` indicator column per
    /// category; null rows are all zero.
    pub fn transform(&self, series: &Series) -> Result<DataFrame> {
        let lookup: HashMap<&str, usize> = self
            .categories
            .iter()
            .enumerate()
            .map(|(code, category)| (category.as_str(), code))
            .collect();
        let values = category_strings(series)?;
        let codes = values
            .iter()
            .map(|value| match value {
                None => Ok(None),
                Some(value) => match lookup.get(value.as_str()).copied() {
                    Some(code) => Ok(Some(code)),
                    None if self.kind == EncodingKind::OneHot
                        && self.handle_unknown == HandleUnknown::Ignore =>
                    {
                        Ok(None)
                    }
                    None => Err(TransformError::UnknownCategory {
                        value: value.clone(),
                    }),
                },
            })
            .collect::<Result<Vec<Option<usize>>>>()?;

        let columns = match self.kind {
            EncodingKind::Label => {
                let labels: Int64Chunked =
                    codes.iter().map(|code| code.map(|c| c as i64)).collect();
                vec![labels.with_name(series.name().clone()).into_column()]
            }
            EncodingKind::OneHot => self
                .indicator_columns()
                .into_iter()
                .enumerate()
                .map(|(position, name)| {
                    let indicator: Vec<i32> = codes
                        .iter()
                        .map(|code| i32::from(*code == Some(position)))
                        .collect();
                    Column::new(name.into(), indicator)
                })
                .collect(),
        };
        Ok(DataFrame::new(columns)?)
    }

    /// Maps an encoded frame back to categories.
    ///
    /// Label input is the column named after the fitted column, or the only
    /// column of `encoded`. One-hot input must carry every indicator column;
    /// rows with no indicator set decode to null. The result has the value
    /// type of the fitted column.
    pub fn inverse_transform(&self, encoded: &DataFrame) -> Result<Series> {
        let decoded = match self.kind {
            EncodingKind::Label => self.inverse_label(encoded)?,
            EncodingKind::OneHot => self.inverse_one_hot(encoded)?,
        };
        self.restore_dtype(Series::new(self.column.as_str().into(), decoded))
    }

    fn restore_dtype(&self, strings: Series) -> Result<Series> {
        match self.dtype {
            CategoryDtype::String => Ok(strings),
            CategoryDtype::Boolean => {
                let flags: BooleanChunked = strings
                    .str()?
                    .into_iter()
                    .map(|value| value.map(|value| value == "true"))
                    .collect();
                Ok(flags.with_name(strings.name().clone()).into_series())
            }
            dtype => Ok(strings.strict_cast(&dtype.data_type())?),
        }
    }

    /// Categories must be distinct, in sorted order and readable as the
    /// recorded value type.
    fn check_categories(&self) -> std::result::Result<(), String> {
        let stored = Series::new(self.column.as_str().into(), &self.categories);
        let canonical = self
            .restore_dtype(stored)
            .and_then(|native| sorted_categories(&native, self.dtype))
            .map_err(|err| err.to_string())?;
        if canonical == self.categories {
            Ok(())
        } else {
            Err("categories are not distinct and sorted".to_string())
        }
    }

    fn inverse_label(&self, encoded: &DataFrame) -> Result<Vec<Option<String>>> {
        let column = match encoded.column(&self.column) {
            Ok(column) => column,
            Err(_) if encoded.width() == 1 => &encoded.get_columns()[0],
            Err(_) => {
                return Err(TransformError::EncodedShape {
                    reason: format!("expected a single column or one named '{}'", self.column),
                });
            }
        };
        let codes = column.as_materialized_series().cast(&DataType::Int64)?;
        codes
            .i64()?
            .into_iter()
            .map(|code| match code {
                None => Ok(None),
                Some(code) => usize::try_from(code)
                    .ok()
                    .and_then(|index| self.categories.get(index))
                    .map(|category| Some(category.clone()))
                    .ok_or_else(|| TransformError::EncodedShape {
                        reason: format!("label {code} is outside 0..{}", self.categories.len()),
                    }),
            })
            .collect()
    }

    fn inverse_one_hot(&self, encoded: &DataFrame) -> Result<Vec<Option<String>>> {
        let mut indicators = Vec::with_capacity(self.categories.len());
        for name in self.indicator_columns() {
            let column = encoded
                .column(&name)
                .map_err(|_| TransformError::EncodedShape {
                    reason: format!("missing indicator column '{name}'"),
                })?;
            let values = column.as_materialized_series().cast(&DataType::Float64)?;
            indicators.push(values.f64()?.into_iter().collect::<Vec<Option<f64>>>());
        }

        (0..encoded.height())
            .map(|row| {
                let set: Vec<usize> = indicators
                    .iter()
                    .enumerate()
                    .filter(|(_, values)| values[row].is_some_and(|v| v != 0.0))
                    .map(|(position, _)| position)
                    .collect();
                match set.as_slice() {
                    [] => Ok(None),
                    [position] => Ok(Some(self.categories[*position].clone())),
                    _ => Err(TransformError::EncodedShape {
                        reason: format!("row {row} has {} indicators set", set.len()),
                    }),
                }
            })
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }

    /// Reads an encoding written by [`FittedEncoding::save`], rejecting
    /// files whose categories are unsorted, repeated or of the wrong type.
    pub fn load(path: &Path) -> Result<Self> {
        let fitted: Self = load_json(path)?;
        fitted
            .check_categories()
            .map_err(|reason| TransformError::InvalidFittedState {
                path: path.to_path_buf(),
                reason,
            })?;
        Ok(fitted)
    }
}

/// Distinct non-null values of `series` as `dtype`, sorted, in string form.
fn sorted_categories(series: &Series, dtype: CategoryDtype) -> Result<Vec<String>> {
    let distinct = series
        .cast(&dtype.data_type())?
        .drop_nulls()
        .unique()?
        .sort(SortOptions::default())?;
    Ok(category_strings(&distinct)?.into_iter().flatten().collect())
}

fn category_strings(series: &Series) -> Result<Vec<Option<String>>> {
    let strings = series.cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Encodes categorical columns of a table.
#[derive(Debug, Clone)]
pub struct Encoder<'a> {
    table: &'a Table,
    kind: EncodingKind,
    handle_unknown: HandleUnknown,
    fitted: Option<FittedEncoding>,
}

impl<'a> Encoder<'a> {
    pub fn new(table: &'a Table, kind: EncodingKind) -> Self {
        Self {
            table,
            kind,
            handle_unknown: HandleUnknown::default(),
            fitted: None,
        }
    }

    /// Builds an encoder from a kind name such as `"onehot"` or `"label"`.
    pub fn from_name(table: &'a Table, kind: &str) -> Result<Self> {
        Ok(Self::new(table, kind.parse()?))
    }

    /// Sets the policy for categories not seen during `fit` (one-hot only).
    #[must_use]
    pub fn with_handle_unknown(mut self, handle_unknown: HandleUnknown) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }

    pub fn kind(&self) -> EncodingKind {
        self.kind
    }

    pub fn fitted(&self) -> Option<&FittedEncoding> {
        self.fitted.as_ref()
    }

    pub fn fit(&mut self, column: &str) -> Result<&FittedEncoding> {
        let series = self.table.column(column)?.as_materialized_series();
        let fitted = FittedEncoding::fit(series, self.kind, self.handle_unknown)?;
        tracing::debug!(
            column,
            kind = %self.kind,
            categories = fitted.categories.len(),
            "fitted encoder"
        );
        Ok(&*self.fitted.insert(fitted))
    }

    pub fn transform(&self, column: &str) -> Result<DataFrame> {
        let fitted = self.require("transform")?;
        fitted.transform(self.table.column(column)?.as_materialized_series())
    }

    pub fn fit_transform(&mut self, column: &str) -> Result<DataFrame> {
        self.fit(column)?;
        self.transform(column)
    }

    pub fn inverse_transform(&self, encoded: &DataFrame) -> Result<Series> {
        self.require("inverse_transform")?.inverse_transform(encoded)
    }

    pub fn mapping(&self) -> Result<BTreeMap<String, CategoryCode>> {
        Ok(self.require("mapping")?.mapping())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.require("save")?.save(path)
    }

    /// Replaces the fitted state with one saved by [`Encoder::save`]. The
    /// encoder adopts the saved kind and unknown-category policy.
    pub fn load(&mut self, path: &Path) -> Result<&FittedEncoding> {
        let fitted = FittedEncoding::load(path)?;
        self.kind = fitted.kind;
        self.handle_unknown = fitted.handle_unknown;
        Ok(&*self.fitted.insert(fitted))
    }

    fn require(&self, operation: &'static str) -> Result<&FittedEncoding> {
        self.fitted.as_ref().ok_or(TransformError::NotFitted {
            component: "Encoder",
            operation,
        })
    }
}
