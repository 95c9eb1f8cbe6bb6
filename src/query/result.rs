//! Result and input types for the query engine

use serde::Serialize;
use serde_json::Value;

use crate::schema::{json_type_name, Record};
use crate::storage::{PrimaryKey, Row};

use super::errors::QueryError;

/// Ordered records returned by `get` and `all`, in table storage order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordCollection {
    records: Vec<Record>,
}

impl RecordCollection {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no records matched
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns an iterator over the records
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Returns the first record, if any
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    /// Returns the record at `index`
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Returns the primary keys, in collection order
    pub fn primary_keys(&self) -> Vec<PrimaryKey> {
        self.records.iter().filter_map(Record::primary_key).collect()
    }

    /// Returns every record as its stored row
    pub fn to_rows(&self) -> Vec<Row> {
        self.records.iter().map(Record::to_row).collect()
    }

    /// Consumes the collection into its records
    pub fn into_vec(self) -> Vec<Record> {
        self.records
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.records.push(record);
    }
}

impl From<Vec<Record>> for RecordCollection {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl FromIterator<Record> for RecordCollection {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecordCollection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Data accepted by `Query::insert`
#[derive(Debug, Clone, PartialEq)]
pub enum InsertInput {
    /// Raw rows; any primary key present is replaced
    Rows(Vec<Row>),
    /// Typed records, re-validated through the bound kind
    Records(Vec<Record>),
}

impl InsertInput {
    /// Returns the number of items to insert
    pub fn len(&self) -> usize {
        match self {
            InsertInput::Rows(rows) => rows.len(),
            InsertInput::Records(records) => records.len(),
        }
    }

    /// Returns true if there is nothing to insert
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts every item into a row, in input order
    pub(crate) fn into_rows(self) -> Vec<Row> {
        match self {
            InsertInput::Rows(rows) => rows,
            InsertInput::Records(records) => records.into_iter().map(Record::into_row).collect(),
        }
    }
}

impl From<Vec<Row>> for InsertInput {
    fn from(rows: Vec<Row>) -> Self {
        InsertInput::Rows(rows)
    }
}

impl From<Row> for InsertInput {
    fn from(row: Row) -> Self {
        InsertInput::Rows(vec![row])
    }
}

impl From<Vec<Record>> for InsertInput {
    fn from(records: Vec<Record>) -> Self {
        InsertInput::Records(records)
    }
}

impl From<Record> for InsertInput {
    fn from(record: Record) -> Self {
        InsertInput::Records(vec![record])
    }
}

impl From<RecordCollection> for InsertInput {
    fn from(collection: RecordCollection) -> Self {
        InsertInput::Records(collection.into_vec())
    }
}

impl TryFrom<Value> for InsertInput {
    type Error = QueryError;

    /// Accepts a JSON array whose elements are all objects.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(QueryError::InvalidInputShape(
                    json_type_name(&other).to_string(),
                ))
            }
        };

        items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                other => Err(QueryError::InvalidInputShape(format!(
                    "array containing {}",
                    json_type_name(&other)
                ))),
            })
            .collect::<Result<Vec<Row>, _>>()
            .map(InsertInput::Rows)
    }
}

/// Records created by an insert
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// Exactly one record was inserted
    One(Record),
    /// Zero or several records were inserted, in input order
    Many(RecordCollection),
}

impl InsertOutcome {
    pub(crate) fn from_inserted(mut inserted: Vec<Record>) -> Self {
        if inserted.len() == 1 {
            if let Some(record) = inserted.pop() {
                return InsertOutcome::One(record);
            }
        }
        InsertOutcome::Many(inserted.into())
    }

    /// Returns the number of inserted records
    pub fn len(&self) -> usize {
        match self {
            InsertOutcome::One(_) => 1,
            InsertOutcome::Many(records) => records.len(),
        }
    }

    /// Returns true if nothing was inserted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the single record, if exactly one was inserted
    pub fn as_one(&self) -> Option<&Record> {
        match self {
            InsertOutcome::One(record) => Some(record),
            InsertOutcome::Many(_) => None,
        }
    }

    /// Returns the inserted records as a collection
    pub fn into_collection(self) -> RecordCollection {
        match self {
            InsertOutcome::One(record) => vec![record].into(),
            InsertOutcome::Many(records) => records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableDef;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(&TableDef::new("sample", "/data"), value).unwrap()
    }

    #[test]
    fn test_collection_accessors() {
        let collection: RecordCollection =
            vec![record(json!({"id": 2})), record(json!({"id": 1}))].into();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.primary_keys(), vec![2, 1]);
        assert_eq!(collection.first().and_then(Record::primary_key), Some(2));
        assert_eq!(collection.to_rows()[1]["id"], json!(1));
        assert_eq!(serde_json::to_value(&collection).unwrap(), json!([{"id": 2}, {"id": 1}]));
    }

    #[test]
    fn test_input_from_json_array() {
        let input = InsertInput::try_from(json!([{"name": "a"}, {"name": "b"}])).unwrap();
        assert_eq!(input.len(), 2);
        assert!(matches!(input, InsertInput::Rows(_)));
    }

    #[test]
    fn test_input_rejects_other_shapes() {
        for bad in [json!(12345), json!("rows"), json!({"name": "a"}), json!([{"a": 1}, 2])] {
            let err = InsertInput::try_from(bad).unwrap_err();
            assert!(matches!(err, QueryError::InvalidInputShape(_)));
        }
    }

    #[test]
    fn test_outcome_single_vs_many() {
        let one = InsertOutcome::from_inserted(vec![record(json!({"id": 1}))]);
        assert!(one.as_one().is_some());
        assert_eq!(one.len(), 1);

        let many = InsertOutcome::from_inserted(vec![
            record(json!({"id": 1})),
            record(json!({"id": 2})),
        ]);
        assert!(many.as_one().is_none());
        assert_eq!(many.into_collection().primary_keys(), vec![1, 2]);

        let none = InsertOutcome::from_inserted(Vec::new());
        assert!(none.is_empty());
    }
}
