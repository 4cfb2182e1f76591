//! Polars `AnyValue` helpers.
//!
//! Error messages that quote a cell go through [`any_to_string`] so the same
//! value always renders the same way.

use polars::prelude::*;

/// Converts a Polars `AnyValue` to display text.
///
/// `Null` becomes the empty string and floats drop redundant trailing zeros,
/// so an integer column read as `Float64` still yields `"3"` rather than `"3.0"`.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use timepp_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Float64(3.0)), "3");
/// assert_eq!(any_to_string(AnyValue::String("red")), "red");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    if let Some(text) = value.get_str() {
        return text.to_string();
    }
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        other => other.to_string(),
    }
}

/// Formats a float, dropping the fractional part when it is zero.
///
/// ```
/// use timepp_common::format_numeric;
///
/// assert_eq!(format_numeric(40.0), "40");
/// assert_eq!(format_numeric(0.25), "0.25");
/// ```
pub fn format_numeric(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        v.to_string()
    }
}
