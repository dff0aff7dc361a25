#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! sheetwriter: append stamped rows to Google Sheets worksheets.

mod cli;
mod commands;
mod config;
mod instrument;
mod sheets;
mod types;
mod writer;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, OutputCtx, write_error};
use config::{GOOGLE_APPLICATION_CREDENTIALS, Settings};
use types::ErrorOutput;
use writer::WriterError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let ctx = OutputCtx::new(
        cli.output,
        cli.json,
        cli.no_header,
        cli.debug,
        cli.snapshot_dir.clone(),
    );

    if let Err(err) = run(&cli, &ctx) {
        let error_output = ErrorOutput::from_writer_error(&err);
        write_error(&error_output, cli.output, cli.json);
        std::process::exit(err.exit_code());
    }
}

fn run(cli: &Cli, ctx: &OutputCtx) -> Result<(), WriterError> {
    let settings = Settings::new(
        &cli.auth,
        cli.api_url.clone(),
        std::env::var_os(GOOGLE_APPLICATION_CREDENTIALS).map(PathBuf::from),
    );
    let mut client = settings.client()?;
    commands::dispatch(&cli.command, ctx, &mut client)
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over `--debug`.
fn init_logging(debug: bool) {
    let default = if debug { "sheetwriter=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
