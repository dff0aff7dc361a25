/// Errors from the sheet-writer domain layer.
use thiserror::Error;

use crate::sheets::SheetsError;

/// Errors that can occur while inserting rows or exporting a worksheet.
#[derive(Debug, Error)]
pub enum WriterError {
    /// The worksheet already has a header row and it differs from the expected one.
    #[error(
        "Existing header does not match the data columns.\n  expected: {}\n  found:    {}",
        expected.join(", "),
        found.join(", ")
    )]
    HeaderMismatch {
        /// Header the insertion would write.
        expected: Vec<String>,
        /// Header currently in row 1.
        found: Vec<String>,
    },

    /// An insert was given zero records.
    #[error("No records to insert")]
    NoRecords,

    /// A record lacks a column present in the first record.
    #[error("Record {index} is missing column '{column}'")]
    MissingColumn {
        /// 0-based position of the offending record.
        index: usize,
        /// The absent column.
        column: String,
    },

    /// A record has a column the first record does not.
    #[error("Record {index} has unexpected column '{column}'")]
    UnexpectedColumn {
        /// 0-based position of the offending record.
        index: usize,
        /// The extra column.
        column: String,
    },

    /// The same column name appears twice in one record or table.
    #[error("Column '{column}' appears more than once")]
    DuplicateColumn {
        /// The repeated name.
        column: String,
    },

    /// A column name is empty or only whitespace.
    #[error("Column {position} has a blank name")]
    BlankColumn {
        /// 0-based position of the column.
        position: usize,
    },

    /// A record uses one of the generated column names.
    #[error("Column '{column}' is reserved for generated values")]
    ReservedColumn {
        /// `unique_id` or `date_inserted`.
        column: String,
    },

    /// A record value is an array or object.
    #[error("Value for column '{column}' is not a scalar")]
    NonScalarValue {
        /// The column holding the nested value.
        column: String,
    },

    /// A table row does not have one cell per column.
    #[error("Table row {index} has {found} cells, expected {expected}")]
    RaggedRow {
        /// 0-based data row index.
        index: usize,
        /// Number of table columns.
        expected: usize,
        /// Number of cells in the row.
        found: usize,
    },

    /// Input could not be parsed into records.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Local file I/O (export destination, input files, snapshots).
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// The file involved.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding/decoding failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An underlying remote error, passed through unmodified.
    #[error(transparent)]
    Sheets(#[from] SheetsError),
}

/// Exit code mapping for `WriterError` variants.
impl WriterError {
    /// Return the CLI exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::HeaderMismatch { .. } => 5,
            Self::NoRecords
            | Self::MissingColumn { .. }
            | Self::UnexpectedColumn { .. }
            | Self::DuplicateColumn { .. }
            | Self::BlankColumn { .. }
            | Self::ReservedColumn { .. }
            | Self::NonScalarValue { .. }
            | Self::RaggedRow { .. }
            | Self::InvalidInput(_) => 6,
            Self::Io { .. } | Self::Csv(_) => 1,
            Self::Sheets(err) => match err {
                e if e.is_auth() => 3,
                SheetsError::SpreadsheetNotFound { .. } | SheetsError::WorksheetNotFound { .. } => 4,
                _ => 1,
            },
        }
    }

    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let mismatch = WriterError::HeaderMismatch {
            expected: vec!["a".to_owned()],
            found: vec!["b".to_owned()],
        };
        assert_eq!(mismatch.exit_code(), 5);
        assert_eq!(WriterError::NoRecords.exit_code(), 6);
        assert_eq!(
            WriterError::from(SheetsError::Unauthorized {
                message: String::new()
            })
            .exit_code(),
            3
        );
        assert_eq!(
            WriterError::from(SheetsError::WorksheetNotFound {
                spreadsheet_id: "S1".to_owned(),
                title: "Nope".to_owned(),
            })
            .exit_code(),
            4
        );
        assert_eq!(
            WriterError::from(SheetsError::RateLimited { retry_after: None }).exit_code(),
            1
        );
    }

    #[test]
    fn test_sheets_error_passes_through_display() {
        let err = WriterError::from(SheetsError::Transport("dns".to_owned()));
        assert_eq!(err.to_string(), "Transport error: dns");
    }
}
