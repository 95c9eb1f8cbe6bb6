//! Typed in-memory records
//!
//! A record keeps an explicit, ordered field list next to its values. The
//! field list is either the kind's declared fields or, for kinds that
//! declare none, the keys of the row it was built from.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::storage::{primary_key_of, PrimaryKey, Row};

use super::errors::{SchemaError, SchemaResult};
use super::kind::RecordKind;

/// One record of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: String,
    primary_key_name: String,
    fields: Vec<String>,
    hidden: Vec<String>,
    values: Row,
}

impl Record {
    /// Builds a record from a row.
    ///
    /// With declared fields, every declared field must be present and
    /// undeclared fields are dropped. The primary key is always kept.
    /// Without declared fields, every field of the row is adopted in order.
    ///
    /// # Errors
    ///
    /// Returns `JSONTABLE_MISSING_FIELD` naming the first absent field.
    pub fn from_row<K: RecordKind + ?Sized>(kind: &K, mut row: Row) -> SchemaResult<Self> {
        let primary_key_name = kind.primary_key_name().to_string();
        let declared = kind.field_names();

        let (fields, values) = if declared.is_empty() {
            (row.keys().cloned().collect(), row)
        } else {
            let mut fields = Vec::with_capacity(declared.len() + 1);
            let mut values = Row::new();

            if !declared.contains(&primary_key_name) {
                if let Some(pk) = row.remove(&primary_key_name) {
                    fields.push(primary_key_name.clone());
                    values.insert(primary_key_name.clone(), pk);
                }
            }

            for field in declared {
                let value = row
                    .remove(field)
                    .ok_or_else(|| SchemaError::missing_field(kind.name(), field))?;
                fields.push(field.clone());
                values.insert(field.clone(), value);
            }

            (fields, values)
        };

        Ok(Self {
            kind: kind.name().to_string(),
            primary_key_name,
            fields,
            hidden: kind.hidden_field_names().to_vec(),
            values,
        })
    }

    /// Builds a record from any JSON value, which must be an object.
    pub fn from_value<K: RecordKind + ?Sized>(kind: &K, value: Value) -> SchemaResult<Self> {
        match value {
            Value::Object(row) => Self::from_row(kind, row),
            other => Err(SchemaError::invalid_row(kind.name(), json_type_name(&other))),
        }
    }

    /// Returns the kind name this record belongs to.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the field names, in order.
    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// Returns a field value, or `None` if the record has no such field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Returns the primary key field name.
    pub fn primary_key_name(&self) -> &str {
        &self.primary_key_name
    }

    /// Returns the primary key, or `None` when unassigned or not an integer.
    pub fn primary_key(&self) -> Option<PrimaryKey> {
        primary_key_of(&self.values, &self.primary_key_name)
    }

    /// Assigns the primary key, adding the field if the record lacks it.
    pub(crate) fn set_primary_key(&mut self, pk: PrimaryKey) {
        if !self.values.contains_key(&self.primary_key_name) {
            self.fields.push(self.primary_key_name.clone());
        }
        self.values
            .insert(self.primary_key_name.clone(), Value::from(pk));
    }

    /// Returns every field as stored on disk, hidden fields included.
    pub fn to_row(&self) -> Row {
        self.values.clone()
    }

    /// Consumes the record into its stored row.
    pub fn into_row(self) -> Row {
        self.values
    }

    /// Returns the visible fields, in field order.
    pub fn to_map(&self) -> Row {
        self.fields
            .iter()
            .filter(|f| !self.hidden.contains(*f))
            .filter_map(|f| self.values.get(f).map(|v| (f.clone(), v.clone())))
            .collect()
    }

    /// Serializes the visible fields as a JSON object.
    pub fn to_json(&self) -> String {
        Value::Object(self.to_map()).to_string()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let visible = self.to_map();
        let mut map = serializer.serialize_map(Some(visible.len()))?;
        for (field, value) in &visible {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

/// Returns a short JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
