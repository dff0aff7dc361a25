/// CLI argument definitions via clap derive.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::writer::record::parse_field;

/// sheetwriter: append stamped rows to Google Sheets worksheets.
#[derive(Debug, Parser)]
#[command(
    name = "sheetwriter",
    about = "Append stamped rows to Google Sheets worksheets and export them as CSV",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output format. Auto-detects: table when TTY, json when piped.
    #[arg(long, global = true, value_name = "FORMAT", default_value = "auto")]
    pub output: OutputFormat,

    /// Shorthand for --output json.
    #[arg(long, global = true, conflicts_with = "output")]
    pub json: bool,

    /// Omit table headers.
    #[arg(long, global = true)]
    pub no_header: bool,

    /// Log API calls and timings to stderr.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Write `<command>_in.json` / `<command>_out.json` snapshots into this directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Sheets API root URL override.
    #[arg(long, global = true, value_name = "URL", env = "SHEETWRITER_API_URL", hide = true)]
    pub api_url: Option<String>,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Credential sources. When several are given, the first in field order wins.
#[derive(Debug, Args)]
pub struct AuthArgs {
    /// Service-account JSON key file.
    #[arg(long, global = true, value_name = "FILE", env = "SHEETWRITER_SERVICE_ACCOUNT")]
    pub service_account: Option<PathBuf>,

    /// OAuth2 `authorized_user` credentials file (client id/secret + refresh token).
    #[arg(long, global = true, value_name = "FILE", env = "SHEETWRITER_AUTHORIZED_USER")]
    pub authorized_user: Option<PathBuf>,

    /// Desktop-app client secrets file; runs the browser consent flow.
    #[arg(long, global = true, value_name = "FILE", env = "SHEETWRITER_CLIENT_SECRETS")]
    pub client_secrets: Option<PathBuf>,

    /// Pre-issued OAuth2 access token.
    #[arg(
        long,
        global = true,
        value_name = "TOKEN",
        env = "SHEETWRITER_ACCESS_TOKEN",
        hide_env_values = true
    )]
    pub access_token: Option<String>,
}

/// Output format variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Auto-detect: table when stdout is a TTY, json when piped.
    #[default]
    Auto,
    /// JSON (pretty-printed).
    Json,
    /// Compact single-line JSON.
    Compact,
    /// Newline-delimited JSON (one object per line).
    Ndjson,
    /// Aligned table (human-readable).
    Table,
}

/// All subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Insert a single record.
    Insert(InsertArgs),
    /// Insert records from a JSON file.
    InsertMany(InsertManyArgs),
    /// Insert every row of a CSV file.
    InsertTable(InsertTableArgs),
    /// Export a worksheet to a CSV file.
    Export(ExportArgs),
    /// Print every row of a worksheet.
    Show(SheetArgs),
    /// Verify the configured credentials can obtain an access token.
    CheckAuth,
}

/// Spreadsheet id and worksheet title.
#[derive(Debug, Args)]
pub struct SheetArgs {
    /// Spreadsheet id (the long key in the sheet URL).
    pub sheet_id: String,

    /// Worksheet (tab) name.
    pub sheet_name: String,
}

/// Arguments for `sheetwriter insert`.
#[derive(Debug, Args)]
pub struct InsertArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    /// Column value as COLUMN=VALUE. Repeat for each column, in order.
    #[arg(
        long = "field",
        short = 'f',
        value_name = "COLUMN=VALUE",
        value_parser = parse_field,
        required_unless_present = "record"
    )]
    pub fields: Vec<(String, String)>,

    /// The record as a JSON object (keys in column order).
    #[arg(long = "record", value_name = "JSON", conflicts_with = "fields")]
    pub record: Option<String>,
}

/// Arguments for `sheetwriter insert-many`.
#[derive(Debug, Args)]
pub struct InsertManyArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    /// JSON file: an array of objects, or an object mapping row ids to objects.
    pub file: PathBuf,
}

/// Arguments for `sheetwriter insert-table`.
#[derive(Debug, Args)]
pub struct InsertTableArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    /// CSV file whose first line names the columns.
    pub file: PathBuf,
}

/// Arguments for `sheetwriter export`.
#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    /// Destination CSV file; created or truncated.
    pub destination: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_insert_fields() {
        let cli = Cli::try_parse_from([
            "sheetwriter", "insert", "S1", "Sheet1", "-f", "name=Alice", "--field", "age=30",
        ])
        .unwrap();
        let Command::Insert(args) = cli.command else {
            panic!("expected insert");
        };
        assert_eq!(args.sheet.sheet_id, "S1");
        assert_eq!(
            args.fields,
            vec![
                ("name".to_owned(), "Alice".to_owned()),
                ("age".to_owned(), "30".to_owned())
            ]
        );
    }

    #[test]
    fn test_insert_requires_fields_or_record() {
        assert!(Cli::try_parse_from(["sheetwriter", "insert", "S1", "Sheet1"]).is_err());
        assert!(
            Cli::try_parse_from(["sheetwriter", "insert", "S1", "Sheet1", "--record", "{}"])
                .is_ok()
        );
    }
}
