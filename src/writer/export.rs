/// Worksheet → local CSV file.
use std::fs::File;
use std::path::Path;

use tracing::info;

use super::errors::WriterError;
use crate::sheets::{SheetKey, Spreadsheets};

/// Write every row of the worksheet to `destination` as CSV, creating or
/// truncating it. Rows are written as the backend returns them, padded to a
/// common width, so blank rows come out as a line of empty fields.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Remote errors, or I/O / CSV errors on the destination.
pub fn export_to_file<B: Spreadsheets + ?Sized>(
    backend: &mut B,
    key: &SheetKey,
    destination: &Path,
) -> Result<usize, WriterError> {
    let worksheet = backend.worksheet(key)?;
    let rows = backend.get_all_values(&worksheet)?;

    let file = File::create(destination).map_err(|e| WriterError::io(destination, e))?;
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(|e| WriterError::io(destination, e))?;

    info!(worksheet = %key, rows = rows.len(), path = %destination.display(), "exported worksheet");
    Ok(rows.len())
}
