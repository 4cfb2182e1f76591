//! Table loading for timepp.
//!
//! Reads delimited files into [`Table`](timepp_model::Table)s through Polars'
//! CSV reader, or wraps a table that is already in memory.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use timepp_ingest::{CsvOptions, Dataset};
//! use timepp_model::Frequency;
//!
//! let options = CsvOptions::default().with_index("date", Some(Frequency::DAILY));
//! let dataset = Dataset::from_csv(Path::new("data/sales.csv"), &options)?;
//! println!("{} rows", dataset.table().height());
//! ```

mod csv;
mod dataset;
mod error;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv::{CsvOptions, MAX_CSV_FILE_SIZE, read_csv_table};

// === Dataset ===
pub use dataset::Dataset;
