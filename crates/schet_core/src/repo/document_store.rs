//! Document store contract consumed by the event engine.
//!
//! # Responsibility
//! - Define create/read/set/unset/delete over JSON documents keyed by
//!   `(collection, id)` with sequential ids.
//! - Provide the semantic `NotFound { deleted }` split shared by every
//!   implementation.
//! - Compute top-level field diffs so callers write partial updates only.
//!
//! # Invariants
//! - Ids are allocated per collection starting at `1` and never reused.
//! - Reading an id in `[1, seq]` that is absent reports `deleted = true`;
//!   any id outside that range reports `deleted = false`.
//! - Each single call is atomic for its `(collection, id)`; nothing spans
//!   documents.
//! - The `id` key of a stored document always equals its assigned id.

use crate::db::DbError;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Top-level JSON object stored per `(collection, id)`.
pub type Document = Map<String, Value>;

/// Reserved document key mirroring the assigned id.
pub const ID_KEY: &str = "id";

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store error.
#[derive(Debug)]
pub enum StoreError {
    /// Target document is absent. `deleted` separates removed ids from ids
    /// the collection sequence never reached.
    NotFound {
        collection: String,
        id: u64,
        deleted: bool,
    },
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Stored or supplied data cannot be encoded/decoded.
    InvalidData(String),
    /// Store refuses writes or its state is unusable.
    Unavailable(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl StoreError {
    pub(crate) fn not_found(collection: &str, id: u64, deleted: bool) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id,
            deleted,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound {
                collection,
                id,
                deleted: true,
            } => write!(f, "document {collection}/{id} has been deleted"),
            Self::NotFound {
                collection,
                id,
                deleted: false,
            } => write!(f, "document {collection}/{id} does not exist"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid document data: {message}"),
            Self::Unavailable(message) => write!(f, "document store unavailable: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "document store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "document store requires table `{table}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
            Self::Unavailable(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Key-value document store with per-collection id sequences.
pub trait DocumentStore {
    /// Allocates the next id of `collection` and persists `document` under it.
    ///
    /// The returned document carries `id` set to the assigned value.
    fn create(&self, collection: &str, document: Document) -> StoreResult<(u64, Document)>;

    /// Loads one document.
    fn read(&self, collection: &str, id: u64) -> StoreResult<Document>;

    /// Replaces each supplied top-level key and returns the merged document.
    ///
    /// An empty `fields` map reads through without writing.
    fn set(&self, collection: &str, id: u64, fields: Document) -> StoreResult<Document>;

    /// Removes the named top-level keys and returns the remaining document.
    fn unset(&self, collection: &str, id: u64, keys: &[String]) -> StoreResult<Document>;

    /// Removes one document. Its id is never handed out again.
    fn delete(&self, collection: &str, id: u64) -> StoreResult<()>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn create(&self, collection: &str, document: Document) -> StoreResult<(u64, Document)> {
        (**self).create(collection, document)
    }

    fn read(&self, collection: &str, id: u64) -> StoreResult<Document> {
        (**self).read(collection, id)
    }

    fn set(&self, collection: &str, id: u64, fields: Document) -> StoreResult<Document> {
        (**self).set(collection, id, fields)
    }

    fn unset(&self, collection: &str, id: u64, keys: &[String]) -> StoreResult<Document> {
        (**self).unset(collection, id, keys)
    }

    fn delete(&self, collection: &str, id: u64) -> StoreResult<()> {
        (**self).delete(collection, id)
    }
}

/// Top-level difference between two versions of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentDiff {
    /// Keys added or changed, with their new values.
    pub set: Document,
    /// Keys present before and absent after.
    pub unset: Vec<String>,
}

impl DocumentDiff {
    pub fn between(before: &Document, after: &Document) -> Self {
        let set = after
            .iter()
            .filter(|(key, value)| before.get(key.as_str()) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let unset = before
            .keys()
            .filter(|key| !after.contains_key(key.as_str()))
            .cloned()
            .collect();

        Self { set, unset }
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }
}

/// Applies replace-per-key merge semantics. `id` is never overwritten.
pub(crate) fn merge_fields(document: &mut Document, fields: Document) {
    for (key, value) in fields {
        if key == ID_KEY {
            continue;
        }
        document.insert(key, value);
    }
}

/// Removes keys from a document. `id` is never removed.
pub(crate) fn remove_fields(document: &mut Document, keys: &[String]) {
    for key in keys {
        if key == ID_KEY {
            continue;
        }
        document.remove(key.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::{merge_fields, remove_fields, Document, DocumentDiff};
    use serde_json::json;

    fn document(value: serde_json::Value) -> Document {
        value.as_object().cloned().expect("test value should be an object")
    }

    #[test]
    fn diff_reports_changed_added_and_removed_keys() {
        let before = document(json!({"id": 1, "title": "a", "fixed": 2, "terms": {}}));
        let after = document(json!({"id": 1, "title": "b", "terms": {}, "extra": true}));

        let diff = DocumentDiff::between(&before, &after);
        assert_eq!(diff.set, document(json!({"title": "b", "extra": true})));
        assert_eq!(diff.unset, vec!["fixed".to_string()]);
    }

    #[test]
    fn diff_of_identical_documents_is_empty() {
        let doc = document(json!({"id": 1, "title": "a"}));
        assert!(DocumentDiff::between(&doc, &doc).is_empty());
    }

    #[test]
    fn merge_and_remove_protect_id_key() {
        let mut doc = document(json!({"id": 1, "title": "a"}));
        merge_fields(&mut doc, document(json!({"id": 9, "title": "b"})));
        remove_fields(&mut doc, &["id".to_string(), "title".to_string()]);
        assert_eq!(doc, document(json!({"id": 1})));
    }
}
