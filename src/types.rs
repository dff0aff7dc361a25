/// Shared serializable output types for all commands.
///
/// These types are what gets written to stdout, either as JSON or rendered
/// as a table. They are decoupled from the internal writer types.
use serde::{Deserialize, Serialize};

use crate::sheets::SheetsError;
use crate::writer::{HeaderAction, InsertReport, WriterError};

/// One appended row's generated fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertedRowOutput {
    pub unique_id: String,
    pub date_inserted: String,
}

/// Result of an insert command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertOutput {
    pub spreadsheet_id: String,
    pub worksheet: String,
    /// Numeric tab id (`gid`).
    pub sheet_id: i64,
    /// Whether this call wrote the header row.
    pub header_written: bool,
    pub header: Vec<String>,
    pub rows: Vec<InsertedRowOutput>,
}

impl From<&InsertReport> for InsertOutput {
    fn from(report: &InsertReport) -> Self {
        Self {
            spreadsheet_id: report.worksheet.key.spreadsheet_id.clone(),
            worksheet: report.worksheet.key.title.clone(),
            sheet_id: report.worksheet.sheet_id,
            header_written: report.header_action == HeaderAction::Created,
            header: report.header.clone(),
            rows: report
                .stamps
                .iter()
                .map(|s| InsertedRowOutput {
                    unique_id: s.id.clone(),
                    date_inserted: s.inserted_at.clone(),
                })
                .collect(),
        }
    }
}

/// Result of `export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutput {
    pub spreadsheet_id: String,
    pub worksheet: String,
    pub destination: String,
    pub rows: usize,
}

/// Result of `check-auth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthOutput {
    pub ok: bool,
    /// `service_account`, `authorized_user`, `installed_app` or `access_token`.
    pub credential_kind: String,
}

/// A structured error envelope for JSON error output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutput {
    /// Always `false`.
    pub ok: bool,
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail in the JSON error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (snake_case).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Header the insert expected (header mismatch only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Vec<String>>,
    /// Header found in the worksheet (header mismatch only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<Vec<String>>,
}

impl ErrorOutput {
    /// Construct from a `WriterError`.
    #[must_use]
    pub fn from_writer_error(err: &WriterError) -> Self {
        let code = match err {
            WriterError::HeaderMismatch { .. } => "header_mismatch",
            WriterError::NoRecords => "no_records",
            WriterError::MissingColumn { .. } => "missing_column",
            WriterError::UnexpectedColumn { .. } => "unexpected_column",
            WriterError::DuplicateColumn { .. } => "duplicate_column",
            WriterError::BlankColumn { .. } => "blank_column",
            WriterError::ReservedColumn { .. } => "reserved_column",
            WriterError::NonScalarValue { .. } => "non_scalar_value",
            WriterError::RaggedRow { .. } => "ragged_row",
            WriterError::InvalidInput(_) => "invalid_input",
            WriterError::Io { .. } => "io_error",
            WriterError::Csv(_) => "csv_error",
            WriterError::Sheets(e) => match e {
                SheetsError::Credentials(_) => "invalid_credentials",
                SheetsError::AuthFailed(_) => "auth_failed",
                SheetsError::Unauthorized { .. } => "unauthorized",
                SheetsError::SpreadsheetNotFound { .. } => "spreadsheet_not_found",
                SheetsError::WorksheetNotFound { .. } => "worksheet_not_found",
                SheetsError::RateLimited { .. } => "rate_limited",
                SheetsError::Status { .. } => "api_error",
                SheetsError::Transport(_) => "transport_error",
                SheetsError::Decode { .. } => "decode_error",
            },
        };
        let (expected, found) = match err {
            WriterError::HeaderMismatch { expected, found } => {
                (Some(expected.clone()), Some(found.clone()))
            }
            _ => (None, None),
        };
        Self {
            ok: false,
            error: ErrorDetail {
                code: code.to_owned(),
                message: err.to_string(),
                expected,
                found,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_mismatch_envelope() {
        let err = WriterError::HeaderMismatch {
            expected: vec!["unique_id".to_owned(), "date_inserted".to_owned(), "name".to_owned()],
            found: vec!["id".to_owned()],
        };
        let json = serde_json::to_value(ErrorOutput::from_writer_error(&err)).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["code"], "header_mismatch");
        assert_eq!(json["error"]["found"], serde_json::json!(["id"]));
    }

    #[test]
    fn test_optional_fields_omitted() {
        let err = WriterError::from(SheetsError::RateLimited { retry_after: Some(3) });
        let json = serde_json::to_value(ErrorOutput::from_writer_error(&err)).unwrap();
        assert_eq!(json["error"]["code"], "rate_limited");
        assert!(json["error"].get("expected").is_none());
    }
}
