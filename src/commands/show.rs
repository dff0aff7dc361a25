/// `show` command: print every row of a worksheet.
use super::sheet_key;
use crate::cli::OutputCtx;
use crate::cli::args::SheetArgs;
use crate::cli::output::write_values;
use crate::sheets::Spreadsheets;
use crate::writer::WriterError;

/// Run `sheetwriter show`.
///
/// # Errors
///
/// Returns `WriterError` on remote failure.
pub fn run(
    args: &SheetArgs,
    ctx: &OutputCtx,
    backend: &mut dyn Spreadsheets,
) -> Result<(), WriterError> {
    let key = sheet_key(args);

    let t_resolve = ctx.timer("resolve_worksheet");
    let worksheet = backend.worksheet(&key)?;
    drop(t_resolve);

    let t_read = ctx.timer("get_all_values");
    let rows = backend.get_all_values(&worksheet)?;
    drop(t_read);

    write_values(&rows, ctx);
    Ok(())
}
