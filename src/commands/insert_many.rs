/// `insert-many` command: append every record of a JSON file.
use std::fs::File;
use std::io::BufReader;

use serde_json::Value;

use super::{instrumented, sheet_key};
use crate::cli::OutputCtx;
use crate::cli::args::InsertManyArgs;
use crate::cli::output::write_insert;
use crate::sheets::Spreadsheets;
use crate::types::InsertOutput;
use crate::writer::{SystemStamper, WriterError, insert_many, records_from_json};

/// Run `sheetwriter insert-many`.
///
/// # Errors
///
/// Returns `WriterError` for unreadable or malformed input, a header mismatch,
/// or any remote failure.
pub fn run(
    args: &InsertManyArgs,
    ctx: &OutputCtx,
    backend: &mut dyn Spreadsheets,
) -> Result<(), WriterError> {
    let t_read = ctx.timer("read_records");
    let file = File::open(&args.file).map_err(|e| WriterError::io(&args.file, e))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| WriterError::InvalidInput(format!("{}: {e}", args.file.display())))?;
    let records = records_from_json(&value)?;
    drop(t_read);

    let key = sheet_key(&args.sheet);
    let output = instrumented(ctx, "insert_many", records.as_slice(), |records| {
        let report = insert_many(backend, &mut SystemStamper, &key, records)?;
        Ok(InsertOutput::from(&report))
    })?;

    write_insert(&output, ctx);
    Ok(())
}
