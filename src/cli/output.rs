/// Output formatting: JSON, NDJSON and table modes. TTY detection.
use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use comfy_table::{Table, presets::UTF8_BORDERS_ONLY};
use serde::Serialize;

use super::args::OutputFormat;
use crate::instrument::Timer;
use crate::types::{AuthOutput, ErrorOutput, ExportOutput, InsertOutput};

/// Resolve the effective output format, handling `--json` flag and TTY auto-detection.
#[must_use]
pub fn resolve_format(fmt: OutputFormat, json_flag: bool) -> OutputFormat {
    if json_flag {
        return OutputFormat::Json;
    }
    if fmt == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        fmt
    }
}

/// Output context passed to all commands.
pub struct OutputCtx {
    pub format: OutputFormat,
    pub no_header: bool,
    /// When true, timing spans are logged.
    pub debug: bool,
    /// Where to write input/output snapshots, if anywhere.
    pub snapshot_dir: Option<PathBuf>,
}

impl OutputCtx {
    /// Construct from CLI args.
    #[must_use]
    pub fn new(
        fmt: OutputFormat,
        json_flag: bool,
        no_header: bool,
        debug: bool,
        snapshot_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            format: resolve_format(fmt, json_flag),
            no_header,
            debug,
            snapshot_dir,
        }
    }

    /// Start a named timer. Logs elapsed on drop only when `--debug` is set.
    #[must_use]
    pub fn timer(&self, label: &'static str) -> Timer {
        Timer::new(label, self.debug)
    }
}

// --- Inserts ---

/// Write an insert result to stdout.
pub fn write_insert(result: &InsertOutput, ctx: &OutputCtx) {
    match ctx.format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Compact => print_compact_json(result),
        OutputFormat::Ndjson => print_ndjson(&result.rows),
        OutputFormat::Table | OutputFormat::Auto => {
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            if !ctx.no_header {
                table.set_header(["UNIQUE ID", "DATE INSERTED"]);
            }
            for row in &result.rows {
                table.add_row([row.unique_id.as_str(), row.date_inserted.as_str()]);
            }
            println!("{table}");
            let header_note = if result.header_written {
                " (header written)"
            } else {
                ""
            };
            println!(
                "{} row(s) appended to {}/{}{header_note}",
                result.rows.len(),
                result.spreadsheet_id,
                result.worksheet
            );
        }
    }
}

// --- Worksheet values ---

/// Write raw worksheet rows to stdout. The first row is treated as the header
/// in table mode.
pub fn write_values(rows: &[Vec<String>], ctx: &OutputCtx) {
    match ctx.format {
        OutputFormat::Json => print_json(rows),
        OutputFormat::Compact => print_compact_json(rows),
        OutputFormat::Ndjson => print_ndjson(rows),
        OutputFormat::Table | OutputFormat::Auto => {
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            let mut iter = rows.iter();
            if let Some(header) = iter.next() {
                if ctx.no_header {
                    table.add_row(header);
                } else {
                    table.set_header(header);
                }
            }
            for row in iter {
                table.add_row(row);
            }
            println!("{table}");
        }
    }
}

// --- Export ---

/// Write an export result to stdout.
pub fn write_export(result: &ExportOutput, ctx: &OutputCtx) {
    match ctx.format {
        OutputFormat::Json | OutputFormat::Auto => print_json(result),
        OutputFormat::Compact => print_compact_json(result),
        OutputFormat::Ndjson => print_ndjson(&[result]),
        OutputFormat::Table => println!(
            "{} row(s) from {}/{} written to {}",
            result.rows, result.spreadsheet_id, result.worksheet, result.destination
        ),
    }
}

// --- Auth ---

/// Write a `check-auth` result to stdout.
pub fn write_auth(result: &AuthOutput, ctx: &OutputCtx) {
    match ctx.format {
        OutputFormat::Json | OutputFormat::Auto => print_json(result),
        OutputFormat::Compact => print_compact_json(result),
        OutputFormat::Ndjson => print_ndjson(&[result]),
        OutputFormat::Table => {
            println!("Access token obtained ({}).", result.credential_kind);
        }
    }
}

// --- Error output ---

/// Write a structured error to stderr.
pub fn write_error(err: &ErrorOutput, format: OutputFormat, json_flag: bool) {
    let fmt = resolve_format(format, json_flag);
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    match fmt {
        OutputFormat::Json | OutputFormat::Compact | OutputFormat::Ndjson => {
            let s = serde_json::to_string_pretty(err).unwrap_or_default();
            let _ = writeln!(out, "{s}");
        }
        _ => {
            let _ = writeln!(out, "Error: {}", err.error.message);
        }
    }
}

// --- Generic JSON helpers ---

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("JSON serialization error: {e}"),
    }
}

fn print_compact_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("JSON serialization error: {e}"),
    }
}

fn print_ndjson<T: Serialize>(values: &[T]) {
    for v in values {
        match serde_json::to_string(v) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("JSON serialization error: {e}"),
        }
    }
}
