//! Configured Store Tests
//!
//! End-to-end use through a loaded configuration file:
//! - Kinds resolve their table files inside the configured directory
//! - Logging can be switched on without changing results
//! - Relations resolve across two tables

use std::fs;

use jsontable::relations::{belongs_to_one, has_many};
use jsontable::{Query, RecordKind, StoreConfig, TableDef};
use serde_json::json;
use tempfile::TempDir;

fn write_config(tmp: &TempDir, log_events: bool) -> StoreConfig {
    let tables = tmp.path().join("tables");
    let config_path = tmp.path().join("store.json");
    let body = json!({
        "path_to_tables": tables.display().to_string(),
        "log_events": log_events,
    });
    fs::write(&config_path, body.to_string()).unwrap();
    StoreConfig::load(&config_path).unwrap()
}

/// Table files land in the configured directory, which is created on first write.
#[test]
fn test_tables_resolve_under_config_dir() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, false);
    let authors = TableDef::from_config("author", &config).table("authors");

    assert_eq!(authors.table_path(), tmp.path().join("tables").join("authors.json"));
    assert!(!authors.table_path().exists());

    Query::from_config(&authors, &config)
        .unwrap()
        .insert_value(json!([{"name": "le guin"}]))
        .unwrap();
    assert!(authors.table_path().exists());
}

/// Logged and silent queries return the same records.
#[test]
fn test_logging_does_not_change_results() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, true);
    let authors = TableDef::from_config("author", &config);

    let logged = Query::from_config(&authors, &config).unwrap();
    logged
        .insert_value(json!([{"name": "a"}, {"name": "b"}, {"name": "c"}]))
        .unwrap();

    let logged = logged.filter("id", ">=", 2).unwrap();
    let silent = Query::new(&authors).unwrap().filter("id", ">=", 2).unwrap();
    assert_eq!(logged.get().unwrap(), silent.get().unwrap());

    assert!(Query::from_config(&authors, &config)
        .unwrap()
        .filter("id", "~=", 1)
        .is_err());
}

/// Books point at authors through `author_id`.
#[test]
fn test_relations_across_tables() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, false);
    let authors = TableDef::from_config("author", &config).table("authors");
    let books = TableDef::from_config("book", &config)
        .table("books")
        .fields(["title", "author_id"]);

    Query::new(&authors)
        .unwrap()
        .insert_value(json!([{"name": "herbert"}, {"name": "butler"}]))
        .unwrap();
    Query::new(&books)
        .unwrap()
        .insert_value(json!([
            {"title": "dune", "author_id": 1},
            {"title": "kindred", "author_id": 2},
            {"title": "children of dune", "author_id": 1},
        ]))
        .unwrap();

    let herbert = Query::new(&authors).unwrap().filter_eq("id", 1).unwrap().first().unwrap().unwrap();
    let titles: Vec<_> = has_many(&herbert, &books, None, None)
        .unwrap()
        .get()
        .unwrap()
        .iter()
        .filter_map(|book| book.get("title").cloned())
        .collect();
    assert_eq!(titles, vec![json!("dune"), json!("children of dune")]);

    let kindred = Query::new(&books).unwrap().filter_eq("title", "kindred").unwrap().first().unwrap().unwrap();
    let author = belongs_to_one(&kindred, &authors, None, None)
        .unwrap()
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(author.get("name"), Some(&json!("butler")));
}
