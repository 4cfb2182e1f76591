//! Shared utilities for timepp crates.
//!
//! - [`polars`]: `AnyValue` display and numeric formatting
//! - [`temporal`]: timestamp parsing and timestamp column conversion

pub mod polars;
pub mod temporal;

pub use polars::{any_to_string, format_numeric};
pub use temporal::{column_timestamps, parse_timestamp, timestamps_to_series};
