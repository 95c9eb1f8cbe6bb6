//! jsontable - A minimal record store backed by JSON array files
//!
//! Each record kind owns one table file holding a top-level JSON array of
//! flat objects. Queries narrow a table by predicates on field values and
//! inserts append rows with auto-incremented primary keys.

pub mod config;
pub mod observability;
pub mod query;
pub mod relations;
pub mod schema;
pub mod storage;

pub use config::{ConfigError, StoreConfig};
pub use query::{InsertInput, InsertOutcome, Query, QueryError, QueryResult, RecordCollection};
pub use schema::{Record, RecordKind, TableDef};
