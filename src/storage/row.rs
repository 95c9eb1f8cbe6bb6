//! Row helpers
//!
//! A row is one element of the table's top-level JSON array: an ordered
//! mapping from field name to a scalar value (string, number, boolean or null).
//! Key order is preserved on read and write.

use serde_json::{Map, Value};

/// One stored row, in on-disk field order.
pub type Row = Map<String, Value>;

/// Primary key value. `0` denotes "unassigned".
pub type PrimaryKey = u64;

/// Extracts the primary key of a row.
///
/// Accepts positive integers, integral floats and numeric strings.
/// Returns `None` when the field is absent, unassigned (`0`) or holds
/// anything else.
pub fn primary_key_of(row: &Row, primary_key_name: &str) -> Option<PrimaryKey> {
    row.get(primary_key_name)
        .and_then(primary_key_value)
        .filter(|pk| *pk > 0)
}

/// Interprets a single value as a primary key.
pub fn primary_key_value(value: &Value) -> Option<PrimaryKey> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}
