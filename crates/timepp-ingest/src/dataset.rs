//! Entry point for loading the working dataset.

use std::path::Path;

use timepp_model::Table;

use crate::csv::{CsvOptions, read_csv_table};
use crate::error::Result;

/// The loaded working dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    table: Table,
}

impl Dataset {
    /// Reads a delimited file.
    pub fn from_csv(path: &Path, options: &CsvOptions) -> Result<Self> {
        let table = read_csv_table(path, options)?;
        Ok(Self { table })
    }

    /// Wraps a table that is already in memory. The table is moved, not copied.
    pub fn from_table(table: Table) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }
}

impl From<Table> for Dataset {
    fn from(table: Table) -> Self {
        Dataset::from_table(table)
    }
}
