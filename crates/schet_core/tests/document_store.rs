use rusqlite::Connection;
use schet_core::db::open_db_in_memory;
use schet_core::{Document, DocumentStore, MemoryDocumentStore, SqliteDocumentStore, StoreError};
use serde_json::{json, Value};

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap()
}

fn assert_not_found<T: std::fmt::Debug>(result: Result<T, StoreError>, expected_deleted: bool) {
    match result {
        Err(StoreError::NotFound { deleted, .. }) => assert_eq!(deleted, expected_deleted),
        other => panic!("expected NotFound(deleted={expected_deleted}), got {other:?}"),
    }
}

fn exercise_contract(store: &dyn DocumentStore) {
    let (first, stored) = store.create("events", doc(json!({"title": "a"}))).unwrap();
    let (second, _) = store.create("events", doc(json!({"title": "b"}))).unwrap();
    let (other, _) = store.create("others", doc(json!({}))).unwrap();
    assert_eq!((first, second, other), (1, 2, 1));
    assert_eq!(stored, doc(json!({"id": 1, "title": "a"})));

    let merged = store
        .set("events", 1, doc(json!({"title": "c", "fixed": 3, "id": 99})))
        .unwrap();
    assert_eq!(merged, doc(json!({"id": 1, "title": "c", "fixed": 3})));

    let unset = store.unset("events", 1, &["fixed".to_string()]).unwrap();
    assert_eq!(unset, doc(json!({"id": 1, "title": "c"})));

    let read_through = store.set("events", 1, Document::new()).unwrap();
    assert_eq!(read_through, unset);
    assert_eq!(store.read("events", 1).unwrap(), unset);

    store.delete("events", 2).unwrap();
    assert_not_found(store.read("events", 2), true);
    assert_not_found(store.delete("events", 2), true);
    assert_not_found(store.set("events", 2, doc(json!({"title": "x"}))), true);
    assert_not_found(store.unset("events", 2, &["title".to_string()]), true);
    assert_not_found(store.read("events", 3), false);
    assert_not_found(store.read("events", 0), false);
    assert_not_found(store.read("missing", 1), false);

    let (third, _) = store.create("events", doc(json!({"title": "d"}))).unwrap();
    assert_eq!(third, 3, "deleted ids are never reused");
}

#[test]
fn memory_store_honors_document_contract() {
    let store = MemoryDocumentStore::new();
    exercise_contract(&store);
    assert_eq!(store.sequence("events").unwrap(), 3);
    assert_eq!(store.sequence("unknown").unwrap(), 0);
}

#[test]
fn sqlite_store_honors_document_contract() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    exercise_contract(&store);
    assert_eq!(store.sequence("events").unwrap(), 3);
}

#[test]
fn read_only_memory_store_refuses_writes_without_side_effects() {
    let store = MemoryDocumentStore::new();
    store.create("events", doc(json!({"title": "a"}))).unwrap();
    store.set_read_only(true);

    assert!(matches!(
        store.create("events", Document::new()),
        Err(StoreError::Unavailable(_))
    ));
    assert!(matches!(
        store.set("events", 1, doc(json!({"title": "b"}))),
        Err(StoreError::Unavailable(_))
    ));
    assert!(matches!(
        store.delete("events", 1),
        Err(StoreError::Unavailable(_))
    ));

    assert_eq!(store.sequence("events").unwrap(), 1);
    assert_eq!(
        store.read("events", 1).unwrap(),
        doc(json!({"id": 1, "title": "a"}))
    );
}

#[test]
fn sqlite_store_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schet.db");

    {
        let conn = schet_core::open_db(&path).unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        store.create("events", doc(json!({"title": "a"}))).unwrap();
        store.create("events", doc(json!({"title": "b"}))).unwrap();
        store.delete("events", 2).unwrap();
    }

    let conn = schet_core::open_db(&path).unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    assert_eq!(
        store.read("events", 1).unwrap(),
        doc(json!({"id": 1, "title": "a"}))
    );
    assert_not_found(store.read("events", 2), true);
    assert_eq!(store.create("events", Document::new()).unwrap().0, 3);
}

#[test]
fn sqlite_store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    match SqliteDocumentStore::try_new(&conn) {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(actual_version, 0);
            assert!(expected_version >= 1);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection must be rejected"),
    }
}

#[test]
fn sqlite_store_rejects_missing_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE sequences;").unwrap();
    match SqliteDocumentStore::try_new(&conn) {
        Err(StoreError::MissingRequiredTable(table)) => assert_eq!(table, "sequences"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("connection without sequences must be rejected"),
    }
}

#[test]
fn sqlite_store_reports_corrupt_bodies_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO documents (collection, id, body) VALUES ('events', 1, '[1, 2]');",
        [],
    )
    .unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    assert!(matches!(
        store.read("events", 1),
        Err(StoreError::InvalidData(_))
    ));
}
