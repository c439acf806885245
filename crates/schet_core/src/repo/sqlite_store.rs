//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist JSON documents in the `documents` table.
//! - Allocate per-collection ids from the `sequences` table.
//!
//! # Invariants
//! - Id allocation and insert commit in one transaction.
//! - `set`/`unset` read, merge and rewrite inside one transaction.
//! - Deleting a document never lowers its collection sequence.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::event::classify;
use crate::repo::document_store::{
    merge_fields, remove_fields, Document, DocumentStore, StoreError, StoreResult, ID_KEY,
};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

const REQUIRED_TABLES: &[&str] = &["documents", "sequences"];

/// `DocumentStore` over a migrated SQLite connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Wraps a connection after checking it carries the expected schema.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` differs from the
    ///   latest migration.
    /// - `MissingRequiredTable` when a store table is absent.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(StoreError::MissingRequiredTable(table));
            }
        }

        Ok(Self { conn })
    }

    /// Current sequence value of `collection`, `0` when never written.
    pub fn sequence(&self, collection: &str) -> StoreResult<u64> {
        current_sequence(self.conn, collection)
    }

    fn missing(&self, collection: &str, id: u64) -> StoreResult<StoreError> {
        let seq = current_sequence(self.conn, collection)?;
        Ok(StoreError::not_found(
            collection,
            id,
            classify(id, seq, false).is_deleted(),
        ))
    }

    fn rewrite<F>(&self, collection: &str, id: u64, apply: F) -> StoreResult<Document>
    where
        F: FnOnce(&mut Document),
    {
        let tx = self.conn.unchecked_transaction()?;
        let mut document = match load_body(&tx, collection, id)? {
            Some(document) => document,
            None => return Err(self.missing(collection, id)?),
        };

        apply(&mut document);
        let body = serde_json::to_string(&document)?;
        tx.execute(
            "UPDATE documents
             SET
                body = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE collection = ?2 AND id = ?3;",
            params![body, collection, to_sql_id(id)?],
        )?;
        tx.commit()?;

        Ok(document)
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn create(&self, collection: &str, mut document: Document) -> StoreResult<(u64, Document)> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO sequences (collection, seq) VALUES (?1, 1)
             ON CONFLICT(collection) DO UPDATE SET seq = seq + 1;",
            [collection],
        )?;
        let raw_id: i64 = tx.query_row(
            "SELECT seq FROM sequences WHERE collection = ?1;",
            [collection],
            |row| row.get(0),
        )?;
        let id = from_sql_id(raw_id)?;

        document.insert(ID_KEY.to_string(), Value::from(id));
        let body = serde_json::to_string(&document)?;
        tx.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3);",
            params![collection, raw_id, body],
        )?;
        tx.commit()?;

        Ok((id, document))
    }

    fn read(&self, collection: &str, id: u64) -> StoreResult<Document> {
        match load_body(self.conn, collection, id)? {
            Some(document) => Ok(document),
            None => Err(self.missing(collection, id)?),
        }
    }

    fn set(&self, collection: &str, id: u64, fields: Document) -> StoreResult<Document> {
        if fields.is_empty() {
            return self.read(collection, id);
        }
        self.rewrite(collection, id, |document| merge_fields(document, fields))
    }

    fn unset(&self, collection: &str, id: u64, keys: &[String]) -> StoreResult<Document> {
        if keys.is_empty() {
            return self.read(collection, id);
        }
        self.rewrite(collection, id, |document| remove_fields(document, keys))
    }

    fn delete(&self, collection: &str, id: u64) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
            params![collection, to_sql_id(id)?],
        )?;

        if changed == 0 {
            return Err(self.missing(collection, id)?);
        }
        Ok(())
    }
}

fn load_body(conn: &Connection, collection: &str, id: u64) -> StoreResult<Option<Document>> {
    let Ok(sql_id) = i64::try_from(id) else {
        return Ok(None);
    };

    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2;",
            params![collection, sql_id],
            |row| row.get(0),
        )
        .optional()?;

    match body {
        Some(text) => match serde_json::from_str::<Value>(&text)? {
            Value::Object(document) => Ok(Some(document)),
            other => Err(StoreError::InvalidData(format!(
                "document {collection}/{id} is not an object: {other}"
            ))),
        },
        None => Ok(None),
    }
}

fn current_sequence(conn: &Connection, collection: &str) -> StoreResult<u64> {
    let seq: Option<i64> = conn
        .query_row(
            "SELECT seq FROM sequences WHERE collection = ?1;",
            [collection],
            |row| row.get(0),
        )
        .optional()?;

    seq.map_or(Ok(0), from_sql_id)
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn to_sql_id(id: u64) -> StoreResult<i64> {
    i64::try_from(id).map_err(|_| StoreError::InvalidData(format!("id `{id}` is out of range")))
}

fn from_sql_id(raw: i64) -> StoreResult<u64> {
    u64::try_from(raw)
        .map_err(|_| StoreError::InvalidData(format!("negative id `{raw}` in storage")))
}
