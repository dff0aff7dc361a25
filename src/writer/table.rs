/// Tabular input: named columns and ordered rows of cells.
use std::path::Path;

use serde::Serialize;

use super::errors::WriterError;
use super::record::{ID_COLUMN, TIMESTAMP_COLUMN};
use crate::sheets::CellValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with these columns.
    ///
    /// # Errors
    ///
    /// `BlankColumn` / `DuplicateColumn` / `ReservedColumn` for unusable
    /// column names.
    pub fn new(columns: Vec<String>) -> Result<Self, WriterError> {
        for (i, column) in columns.iter().enumerate() {
            if column.trim().is_empty() {
                return Err(WriterError::BlankColumn { position: i });
            }
            if column == ID_COLUMN || column == TIMESTAMP_COLUMN {
                return Err(WriterError::ReservedColumn {
                    column: column.clone(),
                });
            }
            if columns[..i].contains(column) {
                return Err(WriterError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// `RaggedRow` if the row does not have one cell per column.
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<(), WriterError> {
        if row.len() != self.columns.len() {
            return Err(WriterError::RaggedRow {
                index: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Read a CSV file whose first line names the columns. Every cell is text.
    ///
    /// # Errors
    ///
    /// I/O or CSV errors, `RaggedRow`, and column-name errors.
    pub fn from_csv_path(path: &Path) -> Result<Self, WriterError> {
        let file = std::fs::File::open(path).map_err(|e| WriterError::io(path, e))?;
        Self::from_csv_reader(file)
    }

    /// Same as [`Table::from_csv_path`] over any reader.
    ///
    /// # Errors
    ///
    /// See [`Table::from_csv_path`].
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, WriterError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let columns = csv_reader
            .headers()?
            .iter()
            .map(str::to_owned)
            .collect();
        let mut table = Self::new(columns)?;
        for record in csv_reader.records() {
            let record = record?;
            table.push_row(record.iter().map(CellValue::from).collect())?;
        }
        Ok(table)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
