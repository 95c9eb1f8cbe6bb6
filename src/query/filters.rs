//! Predicate evaluation
//!
//! Comparison rules:
//! - `==` is loose: a numeric string equals the number it spells, booleans
//!   compare against the truthiness of the other side, and null equals
//!   empty values.
//! - `===` is strict: JSON type and value must match (`1` is not `1.0`).
//! - Ordering compares numbers (and numeric strings) by value and other
//!   strings byte-wise. Pairs with no defined order never match.
//!
//! A field absent from a row evaluates as null.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::schema::Record;
use crate::storage::Row;

use super::ast::{Comparator, Predicate};

/// Evaluates predicates against rows and records
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks a stored row against a predicate
    pub fn matches_row(row: &Row, predicate: &Predicate) -> bool {
        let field_value = row.get(&predicate.field).unwrap_or(&Value::Null);
        Self::evaluate(field_value, predicate.comparator, &predicate.value)
    }

    /// Checks a record against a predicate
    pub fn matches_record(record: &Record, predicate: &Predicate) -> bool {
        let field_value = record.get(&predicate.field).unwrap_or(&Value::Null);
        Self::evaluate(field_value, predicate.comparator, &predicate.value)
    }

    /// Compares one field value with a predicate value
    pub fn evaluate(field_value: &Value, comparator: Comparator, value: &Value) -> bool {
        match comparator {
            Comparator::LooseEq => loose_eq(field_value, value),
            Comparator::StrictEq => field_value == value,
            Comparator::Lt => loose_cmp(field_value, value) == Some(Ordering::Less),
            Comparator::Gt => loose_cmp(field_value, value) == Some(Ordering::Greater),
            Comparator::Lte => matches!(
                loose_cmp(field_value, value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Comparator::Gte => matches!(
                loose_cmp(field_value, value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

/// Parses a numeric string, allowing surrounding whitespace.
fn numeric_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // f64::from_str also accepts "inf" and "NaN" spellings
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn cmp_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

fn cmp_number_str(n: &Number, s: &str) -> Option<Ordering> {
    match numeric_str(s) {
        Some(f) => n.as_f64()?.partial_cmp(&f),
        None => Some(n.to_string().as_str().cmp(s)),
    }
}

fn cmp_strings(a: &str, b: &str) -> Ordering {
    match (numeric_str(a), numeric_str(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), other) | (other, Value::Bool(x)) => truthy(other) == *x,
        (Value::Null, Value::String(s)) | (Value::String(s), Value::Null) => s.is_empty(),
        (Value::Null, other) | (other, Value::Null) => !truthy(other),
        (Value::Number(x), Value::Number(y)) => cmp_numbers(x, y) == Some(Ordering::Equal),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            cmp_number_str(n, s) == Some(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => cmp_strings(x, y) == Ordering::Equal,
        (x, y) => x == y,
    }
}

fn loose_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => cmp_numbers(x, y),
        (Value::Number(n), Value::String(s)) => cmp_number_str(n, s),
        (Value::String(s), Value::Number(n)) => cmp_number_str(n, s).map(Ordering::reverse),
        (Value::String(x), Value::String(y)) => Some(cmp_strings(x, y)),
        (Value::Null, Value::String(s)) => Some("".cmp(s.as_str())),
        (Value::String(s), Value::Null) => Some(s.as_str().cmp("")),
        (Value::Bool(_) | Value::Null, _) | (_, Value::Bool(_) | Value::Null) => {
            Some(truthy(a).cmp(&truthy(b)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(field: Value, op: &str, value: Value) -> bool {
        PredicateFilter::evaluate(&field, op.parse().unwrap(), &value)
    }

    #[test]
    fn test_loose_equality_numeric_string() {
        assert!(eval(json!(5), "==", json!("5")));
        assert!(eval(json!("5"), "=", json!(5)));
        assert!(eval(json!(5), "==", json!(5.0)));
        assert!(eval(json!("10"), "==", json!("1e1")));
        assert!(!eval(json!(5), "==", json!("five")));
        assert!(eval(json!("abc"), "==", json!("abc")));
        assert!(!eval(json!("abc"), "==", json!("ABC")));
    }

    #[test]
    fn test_loose_equality_bool_and_null() {
        assert!(eval(json!(true), "==", json!("yes")));
        assert!(eval(json!(false), "==", json!(0)));
        assert!(eval(json!(null), "==", json!("")));
        assert!(eval(json!(null), "==", json!(0)));
        assert!(!eval(json!(null), "==", json!("0")));
        assert!(!eval(json!(null), "==", json!("a")));
    }

    #[test]
    fn test_strict_equality() {
        assert!(eval(json!(5), "===", json!(5)));
        assert!(!eval(json!(5), "===", json!("5")));
        assert!(!eval(json!(5), "===", json!(5.0)));
        assert!(eval(json!("a"), "===", json!("a")));
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(eval(json!(6), ">", json!(5)));
        assert!(!eval(json!(5), ">", json!(5)));
        assert!(eval(json!(5), ">=", json!(5)));
        assert!(eval(json!(4.5), "<", json!(5)));
        assert!(eval(json!(5), "<=", json!("5")));
        assert!(eval(json!("10"), ">", json!(9)));
        assert!(eval(json!(-3), "<", json!(2)));
    }

    #[test]
    fn test_numeric_strings_order_by_value() {
        assert!(eval(json!("10"), ">", json!("9")));
        assert!(!eval(json!("abc10"), ">", json!("abc9")));
    }

    #[test]
    fn test_string_ordering_is_lexicographic() {
        assert!(eval(json!("apple"), "<", json!("banana")));
        assert!(eval(json!("b"), ">=", json!("b")));
        assert!(!eval(json!("B"), ">", json!("a")));
    }

    #[test]
    fn test_unordered_pairs_never_match() {
        assert!(!eval(json!([1]), "<", json!(5)));
        assert!(!eval(json!({"a": 1}), ">", json!("a")));
    }

    #[test]
    fn test_missing_field_is_null() {
        let row: Row = json!({"name": "a"}).as_object().cloned().unwrap();
        let pred = Predicate::new("id", ">", json!(0)).unwrap();
        assert!(!PredicateFilter::matches_row(&row, &pred));

        let pred = Predicate::new("id", "<", json!(1)).unwrap();
        assert!(PredicateFilter::matches_row(&row, &pred));
    }

    #[test]
    fn test_inf_and_nan_strings_are_not_numeric() {
        assert_eq!(numeric_str("inf"), None);
        assert_eq!(numeric_str("NaN"), None);
        assert_eq!(numeric_str(" 42 "), Some(42.0));
        assert_eq!(numeric_str(""), None);
    }
}
