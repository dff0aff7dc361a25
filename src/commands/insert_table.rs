/// `insert-table` command: append every row of a CSV file.
use super::{instrumented, sheet_key};
use crate::cli::OutputCtx;
use crate::cli::args::InsertTableArgs;
use crate::cli::output::write_insert;
use crate::sheets::Spreadsheets;
use crate::types::InsertOutput;
use crate::writer::{SystemStamper, Table, WriterError, insert_table};

/// Run `sheetwriter insert-table`.
///
/// # Errors
///
/// Returns `WriterError` for an unreadable or ragged CSV, a header mismatch,
/// or any remote failure.
pub fn run(
    args: &InsertTableArgs,
    ctx: &OutputCtx,
    backend: &mut dyn Spreadsheets,
) -> Result<(), WriterError> {
    let t_read = ctx.timer("read_table");
    let table = Table::from_csv_path(&args.file)?;
    drop(t_read);

    let key = sheet_key(&args.sheet);
    let output = instrumented(ctx, "insert_table", &table, |table| {
        let report = insert_table(backend, &mut SystemStamper, &key, table)?;
        Ok(InsertOutput::from(&report))
    })?;

    write_insert(&output, ctx);
    Ok(())
}
