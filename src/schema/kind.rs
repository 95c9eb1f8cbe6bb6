//! Record kinds
//!
//! A record kind describes one table: its primary key, its declared fields,
//! which fields are hidden from projections, and where its file lives.
//! The query engine receives a kind as a parameter and never guesses it.

use std::path::{Path, PathBuf};

use crate::config::StoreConfig;
use crate::storage::Row;

use super::errors::{SchemaError, SchemaResult};
use super::record::Record;

/// Default primary key field name.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Capability interface implemented once per record kind.
pub trait RecordKind {
    /// Lowercase kind name, used to derive foreign key names (`<name>_<pk>`).
    fn name(&self) -> &str;

    /// Primary key field name.
    fn primary_key_name(&self) -> &str {
        DEFAULT_PRIMARY_KEY
    }

    /// Declared fields, in order. Empty means "adopt whatever the row holds".
    fn field_names(&self) -> &[String] {
        &[]
    }

    /// Fields omitted from `Record::to_map`.
    fn hidden_field_names(&self) -> &[String] {
        &[]
    }

    /// Path of the table file backing this kind.
    fn table_path(&self) -> PathBuf;

    /// Checks that the descriptor can back a table.
    fn validate(&self) -> SchemaResult<()> {
        if self.name().trim().is_empty() {
            return Err(SchemaError::not_a_record_kind(self.name(), "kind name is empty"));
        }
        if self.primary_key_name().trim().is_empty() {
            return Err(SchemaError::not_a_record_kind(
                self.name(),
                "primary key name is empty",
            ));
        }
        if self.table_path().file_name().is_none() {
            return Err(SchemaError::not_a_record_kind(
                self.name(),
                "table path has no file name",
            ));
        }
        Ok(())
    }

    /// Builds a record from a row, enforcing the declared fields.
    fn construct(&self, row: Row) -> SchemaResult<Record> {
        Record::from_row(self, row)
    }
}

/// Data-driven record kind.
///
/// ```ignore
/// let samples = TableDef::new("sample", "./tables")
///     .table("samples")
///     .fields(["id", "name", "email"])
///     .hidden(["email"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    name: String,
    table: String,
    primary_key: String,
    fields: Vec<String>,
    hidden: Vec<String>,
    tables_dir: PathBuf,
}

impl TableDef {
    /// Creates a kind whose table is named after the kind and stored in `tables_dir`.
    pub fn new(name: impl Into<String>, tables_dir: impl Into<PathBuf>) -> Self {
        let name = name.into();
        Self {
            table: name.clone(),
            name,
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            fields: Vec::new(),
            hidden: Vec::new(),
            tables_dir: tables_dir.into(),
        }
    }

    /// Creates a kind stored in the configured tables directory.
    pub fn from_config(name: impl Into<String>, config: &StoreConfig) -> Self {
        Self::new(name, config.tables_dir())
    }

    /// Sets the table (file stem) name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Sets the primary key field name.
    pub fn primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    /// Declares the required fields, in order.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the fields hidden from projections.
    pub fn hidden<I, S>(mut self, hidden: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden = hidden.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the table name.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Returns the directory holding the table file.
    pub fn tables_dir(&self) -> &Path {
        &self.tables_dir
    }
}

impl RecordKind for TableDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn primary_key_name(&self) -> &str {
        &self.primary_key
    }

    fn field_names(&self) -> &[String] {
        &self.fields
    }

    fn hidden_field_names(&self) -> &[String] {
        &self.hidden
    }

    fn table_path(&self) -> PathBuf {
        StoreConfig::table_path_in(&self.tables_dir, &self.table)
    }

    fn validate(&self) -> SchemaResult<()> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::not_a_record_kind(&self.name, "kind name is empty"));
        }
        if self.table.trim().is_empty() {
            return Err(SchemaError::not_a_record_kind(&self.name, "table name is empty"));
        }
        if self.table.contains(['/', '\\']) {
            return Err(SchemaError::not_a_record_kind(
                &self.name,
                format!("table name '{}' contains a path separator", self.table),
            ));
        }
        if self.primary_key.trim().is_empty() {
            return Err(SchemaError::not_a_record_kind(
                &self.name,
                "primary key name is empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaErrorCode;

    #[test]
    fn test_defaults() {
        let kind = TableDef::new("sample", "/data");
        assert_eq!(kind.name(), "sample");
        assert_eq!(kind.table_name(), "sample");
        assert_eq!(kind.primary_key_name(), "id");
        assert!(kind.field_names().is_empty());
        assert_eq!(kind.table_path(), PathBuf::from("/data/sample.json"));
        assert!(kind.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let kind = TableDef::new("sample", "/data")
            .table("samples")
            .primary_key("uid")
            .fields(["uid", "name"])
            .hidden(["name"]);
        assert_eq!(kind.table_path(), PathBuf::from("/data/samples.json"));
        assert_eq!(kind.primary_key_name(), "uid");
        assert_eq!(kind.field_names(), ["uid".to_string(), "name".to_string()]);
        assert_eq!(kind.hidden_field_names(), ["name".to_string()]);
    }

    #[test]
    fn test_invalid_kinds_are_rejected() {
        let cases = [
            TableDef::new("", "/data"),
            TableDef::new("sample", "/data").table(""),
            TableDef::new("sample", "/data").table("../escape"),
            TableDef::new("sample", "/data").primary_key(" "),
        ];
        for kind in cases {
            let err = kind.validate().unwrap_err();
            assert_eq!(err.code(), SchemaErrorCode::NotARecordKind);
        }
    }

    struct Inline;

    impl RecordKind for Inline {
        fn name(&self) -> &str {
            "inline"
        }

        fn table_path(&self) -> PathBuf {
            PathBuf::from("inline.json")
        }
    }

    #[test]
    fn test_trait_defaults() {
        assert_eq!(Inline.primary_key_name(), "id");
        assert!(Inline.hidden_field_names().is_empty());
        assert!(Inline.validate().is_ok());
    }
}
