/// `export` command: write a worksheet to a local CSV file.
use super::{instrumented, sheet_key};
use crate::cli::OutputCtx;
use crate::cli::args::ExportArgs;
use crate::cli::output::write_export;
use crate::sheets::Spreadsheets;
use crate::types::ExportOutput;
use crate::writer::{WriterError, export_to_file};

/// Run `sheetwriter export`.
///
/// # Errors
///
/// Returns `WriterError` on remote failure or when the destination cannot be written.
pub fn run(
    args: &ExportArgs,
    ctx: &OutputCtx,
    backend: &mut dyn Spreadsheets,
) -> Result<(), WriterError> {
    let key = sheet_key(&args.sheet);
    let destination = args.destination.display().to_string();

    let output = instrumented(ctx, "export", &destination, |destination| {
        let rows = export_to_file(backend, &key, &args.destination)?;
        Ok(ExportOutput {
            spreadsheet_id: key.spreadsheet_id.clone(),
            worksheet: key.title.clone(),
            destination: destination.clone(),
            rows,
        })
    })?;

    write_export(&output, ctx);
    Ok(())
}
