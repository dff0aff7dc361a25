/// Sheet-writer domain layer: header checks, stamped row inserts, CSV export.
pub mod errors;
pub mod export;
pub mod header;
pub mod insert;
pub mod record;
pub mod stamp;
pub mod table;

pub use errors::WriterError;
pub use export::export_to_file;
pub use header::HeaderAction;
pub use insert::{InsertReport, insert_many, insert_row, insert_table};
pub use record::{Record, records_from_json};
pub use stamp::SystemStamper;
pub use table::Table;
