//! Predicate structures
//!
//! A predicate is `(field, comparator, value)`. It is built and consumed
//! inside a single filter call and never retained by the query.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::schema::json_type_name;

use super::errors::{QueryError, QueryResult};

/// Longest accepted comparator token
pub const MAX_COMPARATOR_LEN: usize = 3;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `=` or `==`: loose equality, numeric strings compare by value
    LooseEq,
    /// `===`: type and value must match
    StrictEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `>=`
    Gte,
}

impl Comparator {
    /// Returns the canonical token
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::LooseEq => "==",
            Comparator::StrictEq => "===",
            Comparator::Lt => "<",
            Comparator::Gt => ">",
            Comparator::Lte => "<=",
            Comparator::Gte => ">=",
        }
    }
}

impl FromStr for Comparator {
    type Err = QueryError;

    fn from_str(token: &str) -> QueryResult<Self> {
        if token.len() > MAX_COMPARATOR_LEN {
            return Err(QueryError::InvalidComparator(token.to_string()));
        }
        match token {
            "=" | "==" => Ok(Comparator::LooseEq),
            "===" => Ok(Comparator::StrictEq),
            "<" => Ok(Comparator::Lt),
            ">" => Ok(Comparator::Gt),
            "<=" => Ok(Comparator::Lte),
            ">=" => Ok(Comparator::Gte),
            other => Err(QueryError::InvalidComparator(other.to_string())),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single filter condition
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Field name
    pub field: String,
    /// Comparison operator
    pub comparator: Comparator,
    /// Value compared against
    pub value: Value,
}

impl Predicate {
    /// Builds a predicate from a comparator token and a value.
    ///
    /// # Errors
    ///
    /// - `InvalidComparator` if the token is longer than three characters
    ///   or not a recognized comparator
    /// - `InvalidValueType` if the value is neither a number nor a string
    pub fn new(field: impl Into<String>, comparator: &str, value: Value) -> QueryResult<Self> {
        let comparator = comparator.parse::<Comparator>()?;
        if !matches!(value, Value::Number(_) | Value::String(_)) {
            return Err(QueryError::InvalidValueType(
                json_type_name(&value).to_string(),
            ));
        }
        Ok(Self {
            field: field.into(),
            comparator,
            value,
        })
    }

    /// Builds a loose equality predicate. Any value type is accepted.
    pub fn equals(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            comparator: Comparator::LooseEq,
            value,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.comparator, self.value)
    }
}
