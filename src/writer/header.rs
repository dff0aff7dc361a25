/// Header-row verification.
///
/// The header is written only when row 1 is empty. The read and the write are
/// separate API calls: the Sheets API has no conditional write, so two
/// concurrent writers can both see an empty row 1. Callers that share a
/// worksheet must serialize inserts themselves.
use tracing::{debug, info};

use super::errors::WriterError;
use crate::sheets::{CellValue, Spreadsheets, Worksheet};

/// Row that holds the header.
pub const HEADER_ROW: usize = 1;

/// What `ensure_header` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    /// Row 1 was empty and the header was written.
    Created,
    /// Row 1 already held the expected header.
    Matched,
}

/// Make sure row 1 of `ws` is exactly `expected`.
///
/// # Errors
///
/// `HeaderMismatch` when row 1 holds a different header (nothing is written),
/// or any remote error.
pub fn ensure_header<B: Spreadsheets + ?Sized>(
    backend: &mut B,
    ws: &Worksheet,
    expected: &[String],
) -> Result<HeaderAction, WriterError> {
    let existing = backend.row_values(ws, HEADER_ROW)?;

    if existing.is_empty() {
        let cells: Vec<CellValue> = expected.iter().map(|h| CellValue::from(h.as_str())).collect();
        backend.write_row(ws, HEADER_ROW, &cells)?;
        info!(worksheet = %ws.key, columns = expected.len(), "wrote header row");
        return Ok(HeaderAction::Created);
    }

    if existing != expected {
        return Err(WriterError::HeaderMismatch {
            expected: expected.to_vec(),
            found: existing,
        });
    }

    debug!(worksheet = %ws.key, "header present");
    Ok(HeaderAction::Matched)
}
