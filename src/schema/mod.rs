//! Record schema subsystem
//!
//! Converts between stored rows and typed records.
//!
//! # Design Principles
//!
//! - Record kinds are explicit values implementing `RecordKind`
//! - Declared fields are validated when a record is built
//! - Kinds with no declared fields infer them from the row
//! - Hidden fields are omitted from projections, never from storage

mod errors;
mod kind;
mod record;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use kind::{RecordKind, TableDef, DEFAULT_PRIMARY_KEY};
pub use record::Record;

pub(crate) use record::json_type_name;
