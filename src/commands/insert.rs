/// `insert` command: append a single record.
use serde_json::Value;

use super::{instrumented, sheet_key};
use crate::cli::OutputCtx;
use crate::cli::args::InsertArgs;
use crate::cli::output::write_insert;
use crate::sheets::Spreadsheets;
use crate::types::InsertOutput;
use crate::writer::{Record, SystemStamper, WriterError, insert_row};

/// Run `sheetwriter insert`.
///
/// # Errors
///
/// Returns `WriterError` for unusable input, a header mismatch, or any remote failure.
pub fn run(
    args: &InsertArgs,
    ctx: &OutputCtx,
    backend: &mut dyn Spreadsheets,
) -> Result<(), WriterError> {
    let record = match &args.record {
        Some(json) => parse_record(json)?,
        None => Record::from_pairs(args.fields.iter().cloned())?,
    };
    let key = sheet_key(&args.sheet);

    let output = instrumented(ctx, "insert_row", &record, |record| {
        let report = insert_row(backend, &mut SystemStamper, &key, record)?;
        Ok(InsertOutput::from(&report))
    })?;

    write_insert(&output, ctx);
    Ok(())
}

fn parse_record(json: &str) -> Result<Record, WriterError> {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(object)) => Record::from_json_object(&object),
        Ok(_) => Err(WriterError::InvalidInput(
            "--record must be a JSON object".to_owned(),
        )),
        Err(e) => Err(WriterError::InvalidInput(format!("--record: {e}"))),
    }
}
