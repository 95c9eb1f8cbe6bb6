//! Query engine
//!
//! A `Query` is bound to one record kind and narrows a set of primary keys.
//!
//! State machine:
//! - `Unfiltered`: no predicate applied yet.
//! - `Filtered(keys)`: keys of the rows matching every predicate so far,
//!   in order of first match, without duplicates. May be empty.
//!
//! The first `filter` streams the whole table. Later `filter` calls only
//! look at the records already matched. `or_filter` runs its predicate as
//! a fresh query over the whole table and unions the keys.
//!
//! `first`, `get` and `all` never change the state. `insert` is the only
//! operation that writes; it rewrites the whole table file.

use std::collections::HashSet;

use serde_json::Value;

use crate::config::StoreConfig;
use crate::observability::{Event, EventScope, Logger, INSERT_EVENTS};
use crate::schema::{Record, RecordKind};
use crate::storage::{primary_key_of, PrimaryKey, Row, StorageResult, TableStore};

use super::ast::Predicate;
use super::errors::{QueryError, QueryResult};
use super::filters::PredicateFilter;
use super::result::{InsertInput, InsertOutcome, RecordCollection};

#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryState {
    Unfiltered,
    Filtered(Vec<PrimaryKey>),
}

/// Query bound to a single record kind
#[derive(Debug)]
pub struct Query<'k, K: RecordKind + ?Sized> {
    kind: &'k K,
    store: TableStore,
    state: QueryState,
    log_events: bool,
}

impl<'k, K: RecordKind + ?Sized> Clone for Query<'k, K> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            store: self.store.clone(),
            state: self.state.clone(),
            log_events: self.log_events,
        }
    }
}

impl<'k, K: RecordKind + ?Sized> Query<'k, K> {
    /// Binds a new, unfiltered query to `kind`.
    ///
    /// # Errors
    ///
    /// Returns `JSONTABLE_NOT_A_RECORD_KIND` if the kind cannot back a table.
    pub fn new(kind: &'k K) -> QueryResult<Self> {
        kind.validate()?;
        Ok(Self {
            kind,
            store: TableStore::new(kind.table_path()),
            state: QueryState::Unfiltered,
            log_events: false,
        })
    }

    /// Binds a query and takes the logging switch from `config`.
    pub fn from_config(kind: &'k K, config: &StoreConfig) -> QueryResult<Self> {
        let query = Self::new(kind)?.with_logging(config.log_events);
        if query.log_events {
            Logger::trace(
                Event::QueryBound.as_str(),
                &[
                    ("kind", kind.name()),
                    ("table", &query.store.path().display().to_string()),
                ],
            );
        }
        Ok(query)
    }

    /// Enables or disables structured log lines for this query.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }

    /// Returns the bound record kind.
    pub fn kind(&self) -> &'k K {
        self.kind
    }

    /// Returns the table store backing this query.
    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// Returns true once a predicate has been applied.
    pub fn is_filtered(&self) -> bool {
        matches!(self.state, QueryState::Filtered(_))
    }

    /// Returns the queried primary keys. Empty while unfiltered.
    pub fn queried(&self) -> &[PrimaryKey] {
        match &self.state {
            QueryState::Unfiltered => &[],
            QueryState::Filtered(keys) => keys,
        }
    }

    /// Narrows the query with `field comparator value`.
    ///
    /// # Errors
    ///
    /// `InvalidComparator` or `InvalidValueType` before any row is read.
    pub fn filter(
        self,
        field: &str,
        comparator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<Self> {
        let predicate = self.build_predicate(field, comparator, value.into())?;
        self.apply(&predicate)
    }

    /// Narrows the query with `field == value`.
    pub fn filter_eq(self, field: &str, value: impl Into<Value>) -> QueryResult<Self> {
        self.apply(&Predicate::equals(field, value.into()))
    }

    /// Unions the rows matching `field comparator value` into the query.
    pub fn or_filter(
        self,
        field: &str,
        comparator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<Self> {
        let predicate = self.build_predicate(field, comparator, value.into())?;
        self.or_apply(&predicate)
    }

    /// Unions the rows matching `field == value` into the query.
    pub fn or_filter_eq(self, field: &str, value: impl Into<Value>) -> QueryResult<Self> {
        self.or_apply(&Predicate::equals(field, value.into()))
    }

    fn build_predicate(&self, field: &str, comparator: &str, value: Value) -> QueryResult<Predicate> {
        Predicate::new(field, comparator, value).map_err(|e| {
            if self.log_events {
                Logger::warn(
                    Event::QueryRejected.as_str(),
                    &[
                        ("code", e.code()),
                        ("field", field),
                        ("kind", self.kind.name()),
                    ],
                );
            }
            e
        })
    }

    /// Applies a predicate conjunctively.
    pub fn apply(mut self, predicate: &Predicate) -> QueryResult<Self> {
        let keys = match &self.state {
            QueryState::Unfiltered => self.scan_table(predicate)?,
            QueryState::Filtered(_) => self
                .get()?
                .iter()
                .filter(|record| PredicateFilter::matches_record(record, predicate))
                .filter_map(Record::primary_key)
                .collect(),
        };

        if self.log_events {
            Logger::trace(
                Event::QueryFiltered.as_str(),
                &[
                    ("kind", self.kind.name()),
                    ("matched", &keys.len().to_string()),
                    ("predicate", &predicate.to_string()),
                ],
            );
        }

        self.state = QueryState::Filtered(keys);
        Ok(self)
    }

    /// Applies a predicate disjunctively.
    pub fn or_apply(mut self, predicate: &Predicate) -> QueryResult<Self> {
        let other = Self::new(self.kind)?.apply(predicate)?;

        let mut keys = match std::mem::replace(&mut self.state, QueryState::Unfiltered) {
            QueryState::Unfiltered => Vec::new(),
            QueryState::Filtered(keys) => keys,
        };
        let mut seen: HashSet<PrimaryKey> = keys.iter().copied().collect();
        for key in other.queried() {
            if seen.insert(*key) {
                keys.push(*key);
            }
        }

        if self.log_events {
            Logger::trace(
                Event::QueryMerged.as_str(),
                &[
                    ("kind", self.kind.name()),
                    ("matched", &keys.len().to_string()),
                    ("predicate", &predicate.to_string()),
                ],
            );
        }

        self.state = QueryState::Filtered(keys);
        Ok(self)
    }

    /// Streams the full table and collects keys of matching rows.
    fn scan_table(&self, predicate: &Predicate) -> QueryResult<Vec<PrimaryKey>> {
        let pk_name = self.kind.primary_key_name();
        let mut keys = Vec::new();
        let mut seen = HashSet::new();

        for row in self.store.stream_rows()? {
            let row = row?;
            if !PredicateFilter::matches_row(&row, predicate) {
                continue;
            }
            if let Some(pk) = primary_key_of(&row, pk_name) {
                if seen.insert(pk) {
                    keys.push(pk);
                }
            }
        }

        Ok(keys)
    }

    /// Returns the stored record for the first queried key.
    ///
    /// Only `queried()[0]` is looked up; the rest of the queried set is
    /// ignored. Returns `None` when nothing is queried.
    pub fn first(&self) -> QueryResult<Option<Record>> {
        let Some(&target) = self.queried().first() else {
            return Ok(None);
        };
        let pk_name = self.kind.primary_key_name();

        for row in self.store.stream_rows()? {
            let row = row?;
            if primary_key_of(&row, pk_name) == Some(target) {
                return Ok(Some(self.kind.construct(row)?));
            }
        }

        Ok(None)
    }

    /// Returns every record of the table, ignoring the queried set.
    pub fn all(&self) -> QueryResult<RecordCollection> {
        self.store
            .read_all()?
            .into_iter()
            .map(|row| self.kind.construct(row).map_err(QueryError::from))
            .collect()
    }

    /// Returns the queried records in table storage order.
    ///
    /// Each key is emitted once: the earliest stored row with that key wins.
    pub fn get(&self) -> QueryResult<RecordCollection> {
        let mut pending: HashSet<PrimaryKey> = self.queried().iter().copied().collect();
        let mut collection = RecordCollection::new();
        if pending.is_empty() {
            return Ok(collection);
        }
        let pk_name = self.kind.primary_key_name();

        for row in self.store.stream_rows()? {
            let row = row?;
            let Some(pk) = primary_key_of(&row, pk_name) else {
                continue;
            };
            if pending.remove(&pk) {
                collection.push(self.kind.construct(row)?);
                if pending.is_empty() {
                    break;
                }
            }
        }

        Ok(collection)
    }

    /// Returns the largest primary key in the table, or 0 when empty.
    pub fn last_primary_key_value(&self) -> QueryResult<PrimaryKey> {
        let pk_name = self.kind.primary_key_name();
        let rows = self.store.stream_rows()?;
        Ok(max_primary_key(rows, pk_name)?)
    }

    /// Inserts rows or records, assigning contiguous primary keys.
    ///
    /// The table is read in full, new keys start after the current maximum,
    /// and the whole table is rewritten. Returns only the inserted records.
    pub fn insert(&self, input: impl Into<InsertInput>) -> QueryResult<InsertOutcome> {
        let input = input.into();
        if input.is_empty() {
            return Ok(InsertOutcome::Many(RecordCollection::new()));
        }

        let table = self.store.path().display().to_string();
        let count = input.len().to_string();
        let scope = EventScope::begin(
            INSERT_EVENTS,
            self.log_events,
            &[
                ("kind", self.kind.name()),
                ("requested", &count),
                ("table", &table),
            ],
        );

        match self.insert_rows(input.into_rows()) {
            Ok(inserted) => {
                let first_key = inserted.first().and_then(Record::primary_key);
                let last_key = inserted.last().and_then(Record::primary_key);
                scope.complete(&[
                    ("first_key", &first_key.unwrap_or(0).to_string()),
                    ("inserted", &inserted.len().to_string()),
                    ("last_key", &last_key.unwrap_or(0).to_string()),
                ]);
                Ok(InsertOutcome::from_inserted(inserted))
            }
            Err(e) => {
                scope.fail(e.code());
                Err(e)
            }
        }
    }

    /// Parses a JSON array of objects and inserts it.
    pub fn insert_value(&self, value: Value) -> QueryResult<InsertOutcome> {
        self.insert(InsertInput::try_from(value)?)
    }

    fn insert_rows(&self, incoming: Vec<Row>) -> QueryResult<Vec<Record>> {
        let pk_name = self.kind.primary_key_name();

        let current = self.store.read_all()?;
        let mut last_key = max_primary_key(current.iter().cloned().map(Ok), pk_name)?;
        let mut table: Vec<Row> = Vec::with_capacity(current.len() + incoming.len());
        for row in current {
            table.push(self.kind.construct(row)?.into_row());
        }

        let mut inserted = Vec::with_capacity(incoming.len());
        for mut row in incoming {
            last_key = last_key
                .checked_add(1)
                .ok_or(QueryError::KeyExhausted(last_key))?;
            row.insert(pk_name.to_string(), Value::from(last_key));
            let mut record = self.kind.construct(row)?;
            record.set_primary_key(last_key);
            table.push(record.to_row());
            inserted.push(record);
        }

        if let Err(e) = self.store.rewrite(&table) {
            if self.log_events {
                Logger::error(
                    Event::TableRewriteFailed.as_str(),
                    &[("error", &e.to_string()), ("kind", self.kind.name())],
                );
            }
            return Err(e.into());
        }

        if self.log_events {
            Logger::info(
                Event::TableRewrite.as_str(),
                &[
                    ("kind", self.kind.name()),
                    ("rows", &table.len().to_string()),
                    ("table", &self.store.path().display().to_string()),
                ],
            );
        }

        Ok(inserted)
    }
}

/// Returns the largest valid primary key among `rows`, or 0.
fn max_primary_key<I>(rows: I, pk_name: &str) -> StorageResult<PrimaryKey>
where
    I: IntoIterator<Item = StorageResult<Row>>,
{
    let mut last = 0;
    for row in rows {
        if let Some(pk) = primary_key_of(&row?, pk_name) {
            last = last.max(pk);
        }
    }
    Ok(last)
}
