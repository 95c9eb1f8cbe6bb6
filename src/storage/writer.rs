//! Atomic table rewrite
//!
//! Every write replaces the whole table file:
//! 1. Serialize all rows into a sibling temp file
//! 2. fsync the temp file
//! 3. Rename temp over the table file (atomic on POSIX)
//! 4. fsync the parent directory
//!
//! Readers see either the previous file or the new one, never a partial
//! write. There is no locking: a concurrent writer can still lose updates.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::row::Row;

/// Returns the temp file path used while rewriting `path`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("table"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replaces the contents of the table at `path` with `rows`.
///
/// Creates the parent directory if needed. On failure the previous table
/// file is left in place and the temp file is removed where possible.
pub fn rewrite(path: &Path, rows: &[Row]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            StorageError::write_failed(
                format!("Failed to create table directory: {}", parent.display()),
                e,
            )
        })?;
    }

    let temp_path = temp_path_for(path);
    if let Err(e) = write_temp(&temp_path, rows) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StorageError::write_failed(
            format!("Failed to move table into place: {}", path.display()),
            e,
        )
    })?;

    // Make the rename itself durable
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

fn write_temp(temp_path: &Path, rows: &[Row]) -> StorageResult<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| {
            StorageError::write_failed(
                format!("Failed to create temp table file: {}", temp_path.display()),
                e,
            )
        })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, rows).map_err(|e| {
        StorageError::write_failed_no_source(format!("Failed to serialize table: {}", e))
    })?;

    let file = writer.into_inner().map_err(|e| {
        StorageError::write_failed(
            format!("Failed to flush temp table file: {}", temp_path.display()),
            e.into_error(),
        )
    })?;

    file.sync_all().map_err(|e| {
        StorageError::write_failed(
            format!("fsync failed for temp table file: {}", temp_path.display()),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::reader::read_all;
    use serde_json::json;
    use tempfile::TempDir;

    fn rows(values: &[serde_json::Value]) -> Vec<Row> {
        values
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_rewrite_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("samples.json");

        rewrite(&path, &rows(&[json!({"id": 1})])).unwrap();

        assert!(path.exists());
        assert_eq!(read_all(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_rewrite_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("samples.json");

        rewrite(&path, &rows(&[json!({"id": 1}), json!({"id": 2})])).unwrap();
        rewrite(&path, &rows(&[json!({"id": 3})])).unwrap();

        let stored = read_all(&path).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["id"], json!(3));
    }

    #[test]
    fn test_rewrite_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("samples.json");

        rewrite(&path, &rows(&[json!({"id": 1})])).unwrap();

        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_rewrite_writes_json_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("samples.json");

        rewrite(&path, &rows(&[json!({"id": 1, "name": "a"})])).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, r#"[{"id":1,"name":"a"}]"#);
    }

    #[test]
    fn test_failed_rename_keeps_previous_table() {
        let dir = TempDir::new().unwrap();
        // A directory where the table file should be makes the rename fail
        let path = dir.path().join("samples.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        let err = rewrite(&path, &rows(&[json!({"id": 1})])).unwrap_err();

        assert!(err.io_error().is_some());
        assert!(path.join("keep").exists());
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let path = Path::new("/data/tables/samples.json");
        assert_eq!(
            temp_path_for(path),
            PathBuf::from("/data/tables/samples.json.tmp")
        );
    }
}
