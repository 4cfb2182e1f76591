//! Parser options forwarded to the Polars CSV reader.

use polars::prelude::DataType;
use timepp_model::Frequency;

use super::reader::MAX_CSV_FILE_SIZE;

/// Options for [`read_csv_table`](super::read_csv_table).
///
/// Parser settings (delimiter, header row, dtype overrides, ...) go to Polars
/// unchanged; `index_column` and `freq` describe the resulting table.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Whether the first non-skipped row holds column names.
    pub has_header: bool,
    /// Rows to skip before the header.
    pub skip_rows: usize,
    /// Rows used for dtype inference (`None` scans the whole file).
    pub infer_schema_length: Option<usize>,
    /// Parse date/datetime-looking string columns into temporal dtypes.
    pub try_parse_dates: bool,
    /// Explicit dtypes for named columns.
    pub dtypes: Vec<(String, DataType)>,
    /// Extra strings read as missing values (the empty field is always missing).
    pub null_values: Vec<String>,
    /// Column to use as the time index.
    pub index_column: Option<String>,
    /// Known frequency of the index column.
    pub freq: Option<Frequency>,
    /// Detect the index frequency when `freq` is not given.
    pub infer_frequency: bool,
    /// Refuse files larger than this many bytes.
    pub max_file_size: u64,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            skip_rows: 0,
            infer_schema_length: Some(100),
            try_parse_dates: true,
            dtypes: Vec::new(),
            null_values: Vec::new(),
            index_column: None,
            freq: None,
            infer_frequency: true,
            max_file_size: MAX_CSV_FILE_SIZE,
        }
    }
}

impl CsvOptions {
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    #[must_use]
    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    #[must_use]
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    #[must_use]
    pub fn with_try_parse_dates(mut self, enable: bool) -> Self {
        self.try_parse_dates = enable;
        self
    }

    /// Forces `column` to be read as `dtype`.
    #[must_use]
    pub fn with_dtype(mut self, column: impl Into<String>, dtype: DataType) -> Self {
        self.dtypes.push((column.into(), dtype));
        self
    }

    #[must_use]
    pub fn with_null_value(mut self, value: impl Into<String>) -> Self {
        self.null_values.push(value.into());
        self
    }

    /// Uses `column` as the time index, optionally with a known frequency.
    #[must_use]
    pub fn with_index(mut self, column: impl Into<String>, freq: Option<Frequency>) -> Self {
        self.index_column = Some(column.into());
        self.freq = freq;
        self
    }

    #[must_use]
    pub fn with_infer_frequency(mut self, enable: bool) -> Self {
        self.infer_frequency = enable;
        self
    }

    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }
}
