//! CSV reading utilities.

mod options;
mod reader;

pub use options::CsvOptions;
pub use reader::{MAX_CSV_FILE_SIZE, read_csv_table};
