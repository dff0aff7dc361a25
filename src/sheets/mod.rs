/// Remote spreadsheet layer: the backend trait, the Google Sheets client and its auth.
pub mod auth;
pub mod client;
pub mod errors;
pub mod http;
#[cfg(test)]
pub mod memory;

pub use auth::Credentials;
pub use client::{CellValue, SheetKey, Spreadsheets, Worksheet};
pub use errors::SheetsError;
pub use http::{GoogleSheets, HttpOptions};
