//! In-memory document store.
//!
//! # Responsibility
//! - Provide a dependency-free `DocumentStore` for tests and ephemeral use.
//!
//! # Invariants
//! - One mutex guards all collections, so every call is atomic.
//! - Sequences survive document deletion.

use crate::model::event::classify;
use crate::repo::document_store::{
    merge_fields, remove_fields, Document, DocumentStore, StoreError, StoreResult, ID_KEY,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryCollection {
    seq: u64,
    documents: BTreeMap<u64, Document>,
}

fn missing(collection: &str, id: u64, seq: u64) -> StoreError {
    StoreError::not_found(collection, id, classify(id, seq, false).is_deleted())
}

/// Process-local `DocumentStore` backed by hash maps.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, MemoryCollection>>,
    read_only: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles write refusal. While enabled, every mutating call fails with
    /// `StoreError::Unavailable` and leaves state untouched.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Current sequence value of `collection`, `0` when never written.
    pub fn sequence(&self, collection: &str) -> StoreResult<u64> {
        let collections = self.lock()?;
        Ok(collections.get(collection).map_or(0, |entry| entry.seq))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, MemoryCollection>>> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn ensure_writable(&self) -> StoreResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is read-only".to_string()));
        }
        Ok(())
    }

    fn update<F>(&self, collection: &str, id: u64, apply: F) -> StoreResult<Document>
    where
        F: FnOnce(&mut Document),
    {
        let mut collections = self.lock()?;
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(collection, id, false))?;
        let seq = entry.seq;
        let document = entry
            .documents
            .get_mut(&id)
            .ok_or_else(|| missing(collection, id, seq))?;
        apply(document);
        Ok(document.clone())
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn create(&self, collection: &str, mut document: Document) -> StoreResult<(u64, Document)> {
        self.ensure_writable()?;
        let mut collections = self.lock()?;
        let entry = collections.entry(collection.to_string()).or_default();

        entry.seq += 1;
        let id = entry.seq;
        document.insert(ID_KEY.to_string(), Value::from(id));
        entry.documents.insert(id, document.clone());

        Ok((id, document))
    }

    fn read(&self, collection: &str, id: u64) -> StoreResult<Document> {
        let collections = self.lock()?;
        let entry = collections
            .get(collection)
            .ok_or_else(|| StoreError::not_found(collection, id, false))?;

        entry
            .documents
            .get(&id)
            .cloned()
            .ok_or_else(|| missing(collection, id, entry.seq))
    }

    fn set(&self, collection: &str, id: u64, fields: Document) -> StoreResult<Document> {
        if fields.is_empty() {
            return self.read(collection, id);
        }
        self.ensure_writable()?;
        self.update(collection, id, |document| merge_fields(document, fields))
    }

    fn unset(&self, collection: &str, id: u64, keys: &[String]) -> StoreResult<Document> {
        if keys.is_empty() {
            return self.read(collection, id);
        }
        self.ensure_writable()?;
        self.update(collection, id, |document| remove_fields(document, keys))
    }

    fn delete(&self, collection: &str, id: u64) -> StoreResult<()> {
        self.ensure_writable()?;
        let mut collections = self.lock()?;
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(collection, id, false))?;

        if entry.documents.remove(&id).is_none() {
            return Err(missing(collection, id, entry.seq));
        }
        Ok(())
    }
}
