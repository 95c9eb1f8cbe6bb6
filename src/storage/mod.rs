//! Table store subsystem
//!
//! A table is a single UTF-8 JSON file holding one top-level array; each
//! element is an object mapping field names to scalar values.
//!
//! # Design Principles
//!
//! - Streaming reads hold one row in memory at a time
//! - A missing or empty file is an empty table, not an error
//! - Writes always replace the whole file via temp file + rename
//! - Single writer; no locking is performed

mod errors;
mod reader;
mod row;
mod table;
mod writer;

pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use reader::{read_all, RowStream};
pub use row::{primary_key_of, primary_key_value, PrimaryKey, Row};
pub use table::TableStore;
pub use writer::{rewrite, temp_path_for};
