/// In-memory `Spreadsheets` used by the domain tests.
use std::collections::HashMap;

use super::client::{CellValue, SheetKey, Spreadsheets, Worksheet, pad_rows};
use super::errors::SheetsError;

/// Counts of remote calls, by kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub resolves: usize,
    pub reads: usize,
    pub writes: usize,
    pub appends: usize,
}

#[derive(Default)]
pub struct MemorySheets {
    tabs: HashMap<SheetKey, Vec<Vec<String>>>,
    pub calls: CallCounts,
    /// When set, every call fails with `SheetsError::Status` carrying this code.
    pub fail_with: Option<u16>,
}

impl MemorySheets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty worksheet.
    pub fn add_sheet(&mut self, key: &SheetKey) {
        self.tabs.entry(key.clone()).or_default();
    }

    /// Add a worksheet pre-populated with rows.
    pub fn add_sheet_with_rows(&mut self, key: &SheetKey, rows: Vec<Vec<String>>) {
        self.tabs.insert(key.clone(), rows);
    }

    #[must_use]
    pub fn rows(&self, key: &SheetKey) -> &[Vec<String>] {
        self.tabs.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn check_failure(&self) -> Result<(), SheetsError> {
        match self.fail_with {
            Some(code) => Err(SheetsError::Status {
                code,
                message: "injected failure".to_owned(),
            }),
            None => Ok(()),
        }
    }

    fn tab_mut(&mut self, ws: &Worksheet) -> Result<&mut Vec<Vec<String>>, SheetsError> {
        self.tabs
            .get_mut(&ws.key)
            .ok_or_else(|| SheetsError::WorksheetNotFound {
                spreadsheet_id: ws.key.spreadsheet_id.clone(),
                title: ws.key.title.clone(),
            })
    }
}

fn render(cells: &[CellValue]) -> Vec<String> {
    let mut row: Vec<String> = cells.iter().map(ToString::to_string).collect();
    while row.last().is_some_and(String::is_empty) {
        row.pop();
    }
    row
}

impl Spreadsheets for MemorySheets {
    fn worksheet(&mut self, key: &SheetKey) -> Result<Worksheet, SheetsError> {
        self.calls.resolves += 1;
        self.check_failure()?;
        if !self
            .tabs
            .keys()
            .any(|k| k.spreadsheet_id == key.spreadsheet_id)
        {
            return Err(SheetsError::SpreadsheetNotFound {
                spreadsheet_id: key.spreadsheet_id.clone(),
            });
        }
        if !self.tabs.contains_key(key) {
            return Err(SheetsError::WorksheetNotFound {
                spreadsheet_id: key.spreadsheet_id.clone(),
                title: key.title.clone(),
            });
        }
        Ok(Worksheet {
            key: key.clone(),
            sheet_id: 0,
        })
    }

    fn row_values(&mut self, ws: &Worksheet, row: usize) -> Result<Vec<String>, SheetsError> {
        self.calls.reads += 1;
        self.check_failure()?;
        let tab = self.tab_mut(ws)?;
        Ok(tab.get(row - 1).cloned().unwrap_or_default())
    }

    fn write_row(
        &mut self,
        ws: &Worksheet,
        row: usize,
        cells: &[CellValue],
    ) -> Result<(), SheetsError> {
        self.calls.writes += 1;
        self.check_failure()?;
        let tab = self.tab_mut(ws)?;
        if tab.len() < row {
            tab.resize(row, Vec::new());
        }
        tab[row - 1] = render(cells);
        Ok(())
    }

    fn append_row(&mut self, ws: &Worksheet, cells: &[CellValue]) -> Result<(), SheetsError> {
        self.calls.appends += 1;
        self.check_failure()?;
        let tab = self.tab_mut(ws)?;
        while tab.last().is_some_and(Vec::is_empty) {
            tab.pop();
        }
        tab.push(render(cells));
        Ok(())
    }

    fn get_all_values(&mut self, ws: &Worksheet) -> Result<Vec<Vec<String>>, SheetsError> {
        self.calls.reads += 1;
        self.check_failure()?;
        let mut rows = self.tab_mut(ws)?.clone();
        pad_rows(&mut rows);
        Ok(rows)
    }
}
