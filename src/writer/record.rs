/// Records: ordered column → value mappings, one per inserted row.
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use super::errors::WriterError;
use crate::sheets::CellValue;

/// Generated identifier column, always first.
pub const ID_COLUMN: &str = "unique_id";
/// Generated insertion-timestamp column, always second.
pub const TIMESTAMP_COLUMN: &str = "date_inserted";

/// One row to insert. Column order is insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column.
    ///
    /// # Errors
    ///
    /// `BlankColumn` for an empty or whitespace-only name, `DuplicateColumn`
    /// if the column already exists, `ReservedColumn` for the generated
    /// column names.
    pub fn push(
        &mut self,
        column: impl Into<String>,
        value: impl Into<CellValue>,
    ) -> Result<(), WriterError> {
        let column = column.into();
        if column.trim().is_empty() {
            return Err(WriterError::BlankColumn {
                position: self.fields.len(),
            });
        }
        if column == ID_COLUMN || column == TIMESTAMP_COLUMN {
            return Err(WriterError::ReservedColumn { column });
        }
        if self.get(&column).is_some() {
            return Err(WriterError::DuplicateColumn { column });
        }
        self.fields.push((column, value.into()));
        Ok(())
    }

    /// Build from `(column, value)` pairs.
    ///
    /// # Errors
    ///
    /// Same as [`Record::push`].
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, WriterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.push(k, v)?;
        }
        Ok(record)
    }

    /// Build from a JSON object, keeping key order.
    ///
    /// # Errors
    ///
    /// `NonScalarValue` for nested arrays/objects, plus [`Record::push`] errors.
    pub fn from_json_object(object: &Map<String, Value>) -> Result<Self, WriterError> {
        let mut record = Self::new();
        for (column, value) in object {
            let cell = CellValue::from_json(value).ok_or_else(|| WriterError::NonScalarValue {
                column: column.clone(),
            })?;
            record.push(column.clone(), cell)?;
        }
        Ok(record)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Values in `columns` order, requiring exactly those columns.
    ///
    /// `index` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// `MissingColumn` / `UnexpectedColumn` when the key sets differ.
    pub fn values_for(&self, columns: &[String], index: usize) -> Result<Vec<CellValue>, WriterError> {
        if let Some(extra) = self.columns().find(|c| !columns.iter().any(|k| k == c)) {
            return Err(WriterError::UnexpectedColumn {
                index,
                column: extra.to_owned(),
            });
        }
        columns
            .iter()
            .map(|column| {
                self.get(column)
                    .cloned()
                    .ok_or_else(|| WriterError::MissingColumn {
                        index,
                        column: column.clone(),
                    })
            })
            .collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// `[unique_id, date_inserted] + columns`.
#[must_use]
pub fn header_for<'a>(columns: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    [ID_COLUMN, TIMESTAMP_COLUMN]
        .into_iter()
        .chain(columns)
        .map(str::to_owned)
        .collect()
}

/// Parse a record collection from JSON.
///
/// Accepts an array of objects, or an object whose values are all objects
/// (keys are row identifiers and are discarded).
///
/// # Errors
///
/// `InvalidInput` for any other shape, plus per-record errors.
pub fn records_from_json(value: &Value) -> Result<Vec<Record>, WriterError> {
    let rows: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => {
            return Err(WriterError::InvalidInput(
                "expected an array of objects or an object of objects".to_owned(),
            ));
        }
    };
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Object(object) => Record::from_json_object(object),
            _ => Err(WriterError::InvalidInput(format!(
                "row {i} is not an object"
            ))),
        })
        .collect()
}

/// Parse a `column=value` CLI argument.
///
/// # Errors
///
/// Returns a message when there is no `=` or the column is empty.
pub fn parse_field(arg: &str) -> Result<(String, String), String> {
    let (column, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{arg}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("empty column name in '{arg}'"));
    }
    Ok((column.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_for() {
        assert_eq!(
            header_for(["name", "age"]),
            vec!["unique_id", "date_inserted", "name", "age"]
        );
    }

    #[test]
    fn test_from_json_object_keeps_order() {
        let value = json!({"zeta": "1", "alpha": 2, "mid": true});
        let record = Record::from_json_object(value.as_object().unwrap()).unwrap();
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(record.get("alpha"), Some(&CellValue::Number(2.into())));
    }

    #[test]
    fn test_nested_value_rejected() {
        let value = json!({"tags": ["a", "b"]});
        let err = Record::from_json_object(value.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, WriterError::NonScalarValue { column } if column == "tags"));
    }

    #[test]
    fn test_reserved_and_duplicate_columns() {
        let mut record = Record::new();
        assert!(matches!(
            record.push("unique_id", "x"),
            Err(WriterError::ReservedColumn { .. })
        ));
        record.push("name", "Alice").unwrap();
        assert!(matches!(
            record.push("name", "Bob"),
            Err(WriterError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_blank_column_rejected() {
        let value = json!({"name": "A", "": "x"});
        let err = Record::from_json_object(value.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, WriterError::BlankColumn { position: 1 }));

        let mut record = Record::new();
        assert!(matches!(
            record.push(" \t", "x"),
            Err(WriterError::BlankColumn { position: 0 })
        ));
    }

    #[test]
    fn test_values_for_aligns_to_columns() {
        let record = Record::from_pairs([("age", "30"), ("name", "Alice")]).unwrap();
        let columns = vec!["name".to_owned(), "age".to_owned()];
        assert_eq!(
            record.values_for(&columns, 0).unwrap(),
            vec![CellValue::from("Alice"), CellValue::from("30")]
        );
    }

    #[test]
    fn test_values_for_missing_and_extra() {
        let columns = vec!["name".to_owned(), "age".to_owned()];
        let missing = Record::from_pairs([("name", "Bob")]).unwrap();
        assert!(matches!(
            missing.values_for(&columns, 3),
            Err(WriterError::MissingColumn { index: 3, column }) if column == "age"
        ));
        let extra = Record::from_pairs([("name", "Bob"), ("age", "1"), ("city", "X")]).unwrap();
        assert!(matches!(
            extra.values_for(&columns, 1),
            Err(WriterError::UnexpectedColumn { column, .. }) if column == "city"
        ));
    }

    #[test]
    fn test_records_from_json_shapes() {
        let array = json!([{"a": "1"}, {"a": "2"}]);
        assert_eq!(records_from_json(&array).unwrap().len(), 2);

        let keyed = json!({"row1": {"a": "1"}, "row2": {"a": "2"}, "row3": {"a": "3"}});
        let records = records_from_json(&keyed).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].get("a"), Some(&CellValue::from("3")));

        assert!(matches!(
            records_from_json(&json!("nope")),
            Err(WriterError::InvalidInput(_))
        ));
        assert!(matches!(
            records_from_json(&json!([1])),
            Err(WriterError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_record_serializes_as_ordered_object() {
        let record = Record::from_pairs([("b", "2"), ("a", "1")]).unwrap();
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"b":"2","a":"1"}"#);
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("name=Alice=Smith").unwrap(),
            ("name".to_owned(), "Alice=Smith".to_owned())
        );
        assert_eq!(parse_field("note=").unwrap(), ("note".to_owned(), String::new()));
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }
}
