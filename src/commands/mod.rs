/// Command dispatch: routes `Command` enum variants to their implementations.
pub mod check_auth;
pub mod export;
pub mod insert;
pub mod insert_many;
pub mod insert_table;
pub mod show;

use serde::Serialize;

use crate::cli::OutputCtx;
use crate::cli::args::{Command, SheetArgs};
use crate::instrument::{timed, with_snapshots};
use crate::sheets::{GoogleSheets, SheetKey};
use crate::writer::WriterError;

/// Dispatch a parsed `Command` to its handler.
///
/// # Errors
///
/// Returns `WriterError` on any command failure.
pub fn dispatch(
    command: &Command,
    ctx: &OutputCtx,
    client: &mut GoogleSheets,
) -> Result<(), WriterError> {
    match command {
        Command::CheckAuth => check_auth::run(ctx, client),
        Command::Insert(args) => insert::run(args, ctx, client),
        Command::InsertMany(args) => insert_many::run(args, ctx, client),
        Command::InsertTable(args) => insert_table::run(args, ctx, client),
        Command::Export(args) => export::run(args, ctx, client),
        Command::Show(args) => show::run(args, ctx, client),
    }
}

fn sheet_key(args: &SheetArgs) -> SheetKey {
    SheetKey::new(&args.sheet_id, &args.sheet_name)
}

/// Run an operation timed, and snapshotted when `--snapshot-dir` is set.
fn instrumented<I, O>(
    ctx: &OutputCtx,
    name: &str,
    input: &I,
    f: impl FnOnce(&I) -> Result<O, WriterError>,
) -> Result<O, WriterError>
where
    I: Serialize + ?Sized,
    O: Serialize,
{
    timed(name, || match &ctx.snapshot_dir {
        Some(dir) => with_snapshots(dir, name, input, f),
        None => f(input),
    })
}
