//! Query subsystem
//!
//! Filters one table by predicates on field values and inserts new rows.
//!
//! # Design Principles
//!
//! - A query is bound to exactly one record kind
//! - Predicates are validated before any row is read
//! - Filtering narrows a set of primary keys; records are loaded on demand
//! - Inserts assign contiguous keys after the current maximum

mod ast;
mod engine;
mod errors;
mod filters;
mod result;

pub use ast::{Comparator, Predicate, MAX_COMPARATOR_LEN};
pub use engine::Query;
pub use errors::{QueryError, QueryResult};
pub use filters::PredicateFilter;
pub use result::{InsertInput, InsertOutcome, RecordCollection};
