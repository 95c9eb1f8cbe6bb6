//! Relation helpers
//!
//! Foreign keys are named `<kind name>_<primary key name>` unless given.
//! Both helpers return a filtered query; nothing is loaded until the
//! caller asks for records.

use serde_json::Value;

use crate::query::{Query, QueryResult};
use crate::schema::{Record, RecordKind};

/// Default foreign key field pointing at `kind`.
pub fn foreign_key_name<K: RecordKind + ?Sized>(kind: &K) -> String {
    format!("{}_{}", kind.name(), kind.primary_key_name())
}

/// Finds the owner of `record`.
///
/// `field` is the field of `record` holding the owner's key and defaults to
/// `<owner>_<owner pk>`. `field_in_owner` defaults to the owner's primary key.
/// A record without the field matches owners whose field is empty.
pub fn belongs_to_one<'k, K: RecordKind + ?Sized>(
    record: &Record,
    owner_kind: &'k K,
    field: Option<&str>,
    field_in_owner: Option<&str>,
) -> QueryResult<Query<'k, K>> {
    let field = field.map_or_else(|| foreign_key_name(owner_kind), str::to_string);
    let field_in_owner = field_in_owner.unwrap_or_else(|| owner_kind.primary_key_name());
    let value = record.get(&field).cloned().unwrap_or(Value::Null);

    Query::new(owner_kind)?.filter_eq(field_in_owner, value)
}

/// Finds the children of `record`.
///
/// `field_in_child` defaults to `<record kind>_<record pk>` and `field`, the
/// field of `record` the children point at, defaults to its primary key.
pub fn has_many<'k, K: RecordKind + ?Sized>(
    record: &Record,
    child_kind: &'k K,
    field_in_child: Option<&str>,
    field: Option<&str>,
) -> QueryResult<Query<'k, K>> {
    let field_in_child = field_in_child.map_or_else(
        || format!("{}_{}", record.kind(), record.primary_key_name()),
        str::to_string,
    );
    let field = field.unwrap_or_else(|| record.primary_key_name());
    let value = record.get(field).cloned().unwrap_or(Value::Null);

    Query::new(child_kind)?.filter_eq(&field_in_child, value)
}
