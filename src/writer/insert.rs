/// Row insertion: header check, then one stamped append per row.
///
/// Appends are sequential, one API call per row. A failure part-way leaves
/// the rows already appended in place; the report is only returned on
/// success.
use tracing::{debug, info};

use super::errors::WriterError;
use super::header::{HeaderAction, ensure_header};
use super::record::{Record, header_for};
use super::stamp::{RowStamp, Stamper};
use super::table::Table;
use crate::sheets::{CellValue, SheetKey, Spreadsheets, Worksheet};

/// Outcome of a successful insert.
#[derive(Debug, Clone)]
pub struct InsertReport {
    pub worksheet: Worksheet,
    pub header: Vec<String>,
    pub header_action: HeaderAction,
    pub stamps: Vec<RowStamp>,
}

/// Insert one record.
///
/// # Errors
///
/// `HeaderMismatch`, or any remote error.
pub fn insert_row<B, S>(
    backend: &mut B,
    stamper: &mut S,
    key: &SheetKey,
    record: &Record,
) -> Result<InsertReport, WriterError>
where
    B: Spreadsheets + ?Sized,
    S: Stamper + ?Sized,
{
    let columns: Vec<String> = record.columns().map(str::to_owned).collect();
    let values = record.values_for(&columns, 0)?;
    append_rows(backend, stamper, key, &columns, vec![values])
}

/// Insert a collection of records sharing the first record's columns.
///
/// Every record is checked against those columns before anything is written.
///
/// # Errors
///
/// `NoRecords`, `MissingColumn`, `UnexpectedColumn`, `HeaderMismatch`, or any
/// remote error.
pub fn insert_many<B, S>(
    backend: &mut B,
    stamper: &mut S,
    key: &SheetKey,
    records: &[Record],
) -> Result<InsertReport, WriterError>
where
    B: Spreadsheets + ?Sized,
    S: Stamper + ?Sized,
{
    let first = records.first().ok_or(WriterError::NoRecords)?;
    let columns: Vec<String> = first.columns().map(str::to_owned).collect();
    let rows = records
        .iter()
        .enumerate()
        .map(|(i, r)| r.values_for(&columns, i))
        .collect::<Result<Vec<_>, _>>()?;
    append_rows(backend, stamper, key, &columns, rows)
}

/// Insert every row of a table.
///
/// # Errors
///
/// `NoRecords` for a table without rows, `HeaderMismatch`, or any remote error.
pub fn insert_table<B, S>(
    backend: &mut B,
    stamper: &mut S,
    key: &SheetKey,
    table: &Table,
) -> Result<InsertReport, WriterError>
where
    B: Spreadsheets + ?Sized,
    S: Stamper + ?Sized,
{
    if table.is_empty() {
        return Err(WriterError::NoRecords);
    }
    append_rows(backend, stamper, key, table.columns(), table.rows().to_vec())
}

fn append_rows<B, S>(
    backend: &mut B,
    stamper: &mut S,
    key: &SheetKey,
    columns: &[String],
    rows: Vec<Vec<CellValue>>,
) -> Result<InsertReport, WriterError>
where
    B: Spreadsheets + ?Sized,
    S: Stamper + ?Sized,
{
    let worksheet = backend.worksheet(key)?;
    let header = header_for(columns.iter().map(String::as_str));
    let header_action = ensure_header(backend, &worksheet, &header)?;

    let mut stamps = Vec::with_capacity(rows.len());
    for values in rows {
        let stamp = stamper.stamp();
        let mut cells: Vec<CellValue> = stamp.cells().into();
        cells.extend(values);
        backend.append_row(&worksheet, &cells)?;
        debug!(worksheet = %key, id = %stamp.id, "appended row");
        stamps.push(stamp);
    }

    info!(worksheet = %key, rows = stamps.len(), "insert complete");
    Ok(InsertReport {
        worksheet,
        header,
        header_action,
        stamps,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::sheets::memory::{CallCounts, MemorySheets};
    use crate::sheets::SheetsError;
    use crate::writer::stamp::SystemStamper;

    /// Deterministic stamps: `id-1`, `id-2`, ...
    struct CountingStamper(usize);

    impl Stamper for CountingStamper {
        fn stamp(&mut self) -> RowStamp {
            self.0 += 1;
            RowStamp {
                id: format!("id-{}", self.0),
                inserted_at: "2024-01-02 03:04:05".to_owned(),
            }
        }
    }

    fn sheet() -> (MemorySheets, SheetKey) {
        let key = SheetKey::new("S1", "Sheet1");
        let mut backend = MemorySheets::new();
        backend.add_sheet(&key);
        (backend, key)
    }

    fn row(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_insert_row_on_empty_sheet() {
        let (mut backend, key) = sheet();
        let record = Record::from_pairs([("name", "Alice"), ("age", "30")]).unwrap();
        let report = insert_row(&mut backend, &mut SystemStamper, &key, &record).unwrap();

        assert_eq!(report.header_action, HeaderAction::Created);
        let rows = backend.rows(&key);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], row(&["unique_id", "date_inserted", "name", "age"]));
        assert_eq!(rows[1][0], report.stamps[0].id);
        assert_eq!(rows[1][1], report.stamps[0].inserted_at);
        assert_eq!(&rows[1][2..], &row(&["Alice", "30"])[..]);
    }

    #[test]
    fn test_second_insert_keeps_header() {
        let (mut backend, key) = sheet();
        let alice = Record::from_pairs([("name", "Alice"), ("age", "30")]).unwrap();
        let bob = Record::from_pairs([("name", "Bob"), ("age", "25")]).unwrap();

        let first = insert_row(&mut backend, &mut SystemStamper, &key, &alice).unwrap();
        let second = insert_row(&mut backend, &mut SystemStamper, &key, &bob).unwrap();

        assert_eq!(second.header_action, HeaderAction::Matched);
        assert_eq!(backend.calls.writes, 1);
        assert_eq!(backend.calls.appends, 2);
        assert_ne!(first.stamps[0].id, second.stamps[0].id);

        let rows = backend.rows(&key);
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[2][2..], &row(&["Bob", "25"])[..]);
    }

    #[test]
    fn test_insert_row_header_mismatch_writes_nothing() {
        let key = SheetKey::new("S1", "Sheet1");
        let mut backend = MemorySheets::new();
        backend.add_sheet_with_rows(&key, vec![row(&["unique_id", "date_inserted", "email"])]);
        let record = Record::from_pairs([("name", "Alice")]).unwrap();

        let err = insert_row(&mut backend, &mut SystemStamper, &key, &record).unwrap_err();
        assert!(matches!(err, WriterError::HeaderMismatch { .. }));
        assert_eq!(backend.calls.writes, 0);
        assert_eq!(backend.calls.appends, 0);
        assert_eq!(backend.rows(&key).len(), 1);
    }

    #[test]
    fn test_insert_many_appends_one_row_per_record() {
        let (mut backend, key) = sheet();
        let records: Vec<Record> = (0..5)
            .map(|i| Record::from_pairs([("n", i.to_string())]).unwrap())
            .collect();
        let report = insert_many(&mut backend, &mut SystemStamper, &key, &records).unwrap();

        assert_eq!(backend.calls.appends, 5);
        assert_eq!(backend.rows(&key).len(), 6);
        let ids: HashSet<&str> = report.stamps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_insert_many_orders_values_by_first_record() {
        let (mut backend, key) = sheet();
        let records = vec![
            Record::from_pairs([("name", "Alice"), ("age", "30")]).unwrap(),
            Record::from_pairs([("age", "25"), ("name", "Bob")]).unwrap(),
        ];
        insert_many(&mut backend, &mut CountingStamper(0), &key, &records).unwrap();
        let rows = backend.rows(&key);
        assert_eq!(rows[2], row(&["id-2", "2024-01-02 03:04:05", "Bob", "25"]));
    }

    #[test]
    fn test_insert_many_empty_makes_no_calls() {
        let (mut backend, key) = sheet();
        let err = insert_many(&mut backend, &mut SystemStamper, &key, &[]).unwrap_err();
        assert!(matches!(err, WriterError::NoRecords));
        assert_eq!(backend.calls, CallCounts::default());
    }

    #[test]
    fn test_insert_many_validates_before_writing() {
        let (mut backend, key) = sheet();
        let records = vec![
            Record::from_pairs([("name", "Alice"), ("age", "30")]).unwrap(),
            Record::from_pairs([("name", "Bob")]).unwrap(),
        ];
        let err = insert_many(&mut backend, &mut SystemStamper, &key, &records).unwrap_err();
        assert!(matches!(err, WriterError::MissingColumn { index: 1, .. }));
        assert_eq!(backend.calls, CallCounts::default());
    }

    #[test]
    fn test_insert_table() {
        let (mut backend, key) = sheet();
        let table = Table::from_csv_reader("name,age\nAlice,30\nBob,25\n".as_bytes()).unwrap();
        let report = insert_table(&mut backend, &mut CountingStamper(0), &key, &table).unwrap();

        assert_eq!(report.stamps.len(), 2);
        assert_eq!(
            backend.rows(&key),
            &[
                row(&["unique_id", "date_inserted", "name", "age"]),
                row(&["id-1", "2024-01-02 03:04:05", "Alice", "30"]),
                row(&["id-2", "2024-01-02 03:04:05", "Bob", "25"]),
            ]
        );
    }

    #[test]
    fn test_insert_table_empty() {
        let (mut backend, key) = sheet();
        let table = Table::from_csv_reader("name\n".as_bytes()).unwrap();
        assert!(matches!(
            insert_table(&mut backend, &mut SystemStamper, &key, &table),
            Err(WriterError::NoRecords)
        ));
    }

    #[test]
    fn test_unknown_worksheet_passes_through() {
        let (mut backend, _) = sheet();
        let record = Record::from_pairs([("name", "Alice")]).unwrap();
        let err = insert_row(
            &mut backend,
            &mut SystemStamper,
            &SheetKey::new("S1", "Missing"),
            &record,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WriterError::Sheets(SheetsError::WorksheetNotFound { .. })
        ));
    }

    #[test]
    fn test_remote_failure_passes_through() {
        let (mut backend, key) = sheet();
        backend.fail_with = Some(503);
        let record = Record::from_pairs([("name", "Alice")]).unwrap();
        let err = insert_row(&mut backend, &mut SystemStamper, &key, &record).unwrap_err();
        assert!(matches!(
            err,
            WriterError::Sheets(SheetsError::Status { code: 503, .. })
        ));
        assert_eq!(backend.calls.resolves, 1);
    }
}
