/// Generated row prefix: a random id and the local insertion time.
use chrono::Local;
use uuid::Uuid;

use crate::sheets::CellValue;

/// Format of `date_inserted`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `(unique_id, date_inserted)` for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowStamp {
    pub id: String,
    pub inserted_at: String,
}

impl RowStamp {
    /// The two leading cells of a data row.
    #[must_use]
    pub fn cells(&self) -> [CellValue; 2] {
        [
            CellValue::Text(self.id.clone()),
            CellValue::Text(self.inserted_at.clone()),
        ]
    }
}

/// Source of row stamps.
pub trait Stamper {
    fn stamp(&mut self) -> RowStamp;
}

/// UUIDv4 + `Local::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemStamper;

impl Stamper for SystemStamper {
    fn stamp(&mut self) -> RowStamp {
        RowStamp {
            id: Uuid::new_v4().to_string(),
            inserted_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}
