//! Table store
//!
//! Owns the path of one table file and exposes the three storage
//! operations the query engine needs: streaming read, full read and
//! full rewrite.

use std::path::{Path, PathBuf};

use super::errors::StorageResult;
use super::reader::{self, RowStream};
use super::row::Row;
use super::writer;

/// Durable row storage for a single table file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStore {
    path: PathBuf,
}

impl TableStore {
    /// Creates a store for the table at `path`. The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the table file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether the table file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Streams rows lazily. Each call reopens the file.
    pub fn stream_rows(&self) -> StorageResult<RowStream> {
        RowStream::open(&self.path)
    }

    /// Reads every row into memory, in storage order.
    pub fn read_all(&self) -> StorageResult<Vec<Row>> {
        reader::read_all(&self.path)
    }

    /// Replaces the table with `rows`. The caller must pass every row to keep.
    pub fn rewrite(&self, rows: &[Row]) -> StorageResult<()> {
        writer::rewrite(&self.path, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = TableStore::new(dir.path().join("samples.json"));
        assert!(!store.exists());
        assert!(store.read_all().unwrap().is_empty());

        let rows: Vec<Row> = vec![
            json!({"id": 1, "name": "a"}).as_object().cloned().unwrap(),
            json!({"id": 2, "name": "b"}).as_object().cloned().unwrap(),
        ];
        store.rewrite(&rows).unwrap();

        assert!(store.exists());
        assert_eq!(store.read_all().unwrap(), rows);
        let streamed: Vec<Row> = store
            .stream_rows()
            .unwrap()
            .collect::<StorageResult<_>>()
            .unwrap();
        assert_eq!(streamed, rows);
    }

    #[test]
    fn test_stream_after_rewrite_sees_new_rows() {
        let dir = TempDir::new().unwrap();
        let store = TableStore::new(dir.path().join("samples.json"));

        store
            .rewrite(&[json!({"id": 1}).as_object().cloned().unwrap()])
            .unwrap();
        assert_eq!(store.stream_rows().unwrap().count(), 1);

        store.rewrite(&[]).unwrap();
        assert_eq!(store.stream_rows().unwrap().count(), 0);
    }
}
