/// The backend seam: anything that can read and append worksheet rows.
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::errors::SheetsError;

/// `(spreadsheet id, worksheet title)`: addresses one tab of one spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetKey {
    pub spreadsheet_id: String,
    pub title: String,
}

impl SheetKey {
    #[must_use]
    pub fn new(spreadsheet_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            title: title.into(),
        }
    }
}

impl fmt::Display for SheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.spreadsheet_id, self.title)
    }
}

/// A worksheet that the backend has confirmed exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    pub key: SheetKey,
    /// Numeric tab id (`gid`) reported by the remote.
    pub sheet_id: i64,
}

impl Worksheet {
    /// A1 range covering a single row, e.g. `'Sheet1'!A3`.
    #[must_use]
    pub fn row_range(&self, row: usize) -> String {
        format!("{}!A{row}", quote_title(&self.key.title))
    }

    /// A1 range covering the whole tab.
    #[must_use]
    pub fn full_range(&self) -> String {
        quote_title(&self.key.title)
    }
}

/// Quote a worksheet title for A1 notation. Embedded quotes are doubled.
#[must_use]
pub fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Pad rows with empty cells so every row is as wide as the widest one.
/// The API omits trailing empty cells and returns blank rows as `[]`.
pub fn pad_rows(rows: &mut [Vec<String>]) {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in rows {
        row.resize(width, String::new());
    }
}

/// A scalar cell value as sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Empty,
}

impl CellValue {
    /// Convert a JSON scalar. Arrays and objects are not cells.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Null => Some(Self::Empty),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// JSON form for a `ValueRange` payload.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Empty => Value::String(String::new()),
        }
    }
}

/// Rendered the way the Sheets UI displays a raw value.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(true) => f.write_str("TRUE"),
            Self::Bool(false) => f.write_str("FALSE"),
            Self::Empty => Ok(()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Remote operations the sheet writer needs.
///
/// Rows are 1-based. Reads return formatted cell text with trailing empty
/// cells dropped, matching the Sheets `values.get` behaviour.
pub trait Spreadsheets {
    /// Resolve a worksheet by title.
    ///
    /// # Errors
    ///
    /// `SpreadsheetNotFound` / `WorksheetNotFound`, or any transport/auth error.
    fn worksheet(&mut self, key: &SheetKey) -> Result<Worksheet, SheetsError>;

    /// Cell text of one row; empty when the row is blank.
    ///
    /// # Errors
    ///
    /// Any remote error.
    fn row_values(&mut self, ws: &Worksheet, row: usize) -> Result<Vec<String>, SheetsError>;

    /// Overwrite a single row starting at column A.
    ///
    /// # Errors
    ///
    /// Any remote error.
    fn write_row(&mut self, ws: &Worksheet, row: usize, cells: &[CellValue])
        -> Result<(), SheetsError>;

    /// Append a row after the last non-empty row.
    ///
    /// # Errors
    ///
    /// Any remote error.
    fn append_row(&mut self, ws: &Worksheet, cells: &[CellValue]) -> Result<(), SheetsError>;

    /// Every row of the worksheet, each padded with empty cells to the
    /// width of the widest row.
    ///
    /// # Errors
    ///
    /// Any remote error.
    fn get_all_values(&mut self, ws: &Worksheet) -> Result<Vec<Vec<String>>, SheetsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws(title: &str) -> Worksheet {
        Worksheet {
            key: SheetKey::new("S1", title),
            sheet_id: 0,
        }
    }

    #[test]
    fn test_pad_rows_to_widest() {
        let mut rows = vec![
            vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            vec![],
            vec!["d".to_owned()],
        ];
        pad_rows(&mut rows);
        assert_eq!(rows[1], vec!["", "", ""]);
        assert_eq!(rows[2], vec!["d", "", ""]);

        let mut empty: Vec<Vec<String>> = Vec::new();
        pad_rows(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_row_range_quotes_title() {
        assert_eq!(ws("Sheet1").row_range(1), "'Sheet1'!A1");
        assert_eq!(ws("Bob's data").row_range(4), "'Bob''s data'!A4");
    }

    #[test]
    fn test_full_range() {
        assert_eq!(ws("My Tab").full_range(), "'My Tab'");
    }

    #[test]
    fn test_cell_from_json_rejects_containers() {
        assert_eq!(
            CellValue::from_json(&serde_json::json!("x")),
            Some(CellValue::Text("x".to_owned()))
        );
        assert_eq!(CellValue::from_json(&Value::Null), Some(CellValue::Empty));
        assert_eq!(CellValue::from_json(&serde_json::json!([1, 2])), None);
        assert_eq!(CellValue::from_json(&serde_json::json!({"a": 1})), None);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Bool(true).to_string(), "TRUE");
        assert_eq!(CellValue::Number(30.into()).to_string(), "30");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Empty.to_json(), serde_json::json!(""));
    }
}
