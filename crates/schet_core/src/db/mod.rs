//! SQLite persistence for the document store.
//!
//! # Responsibility
//! - Hand out connections whose schema holds the `documents` table (one JSON
//!   body per `(collection, id)`) and the `sequences` table (last id handed
//!   out per collection).
//! - Report which schema step failed when a database cannot be prepared.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version` and only moves forward.
//! - A connection is returned only after every migration committed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating a document database.
#[derive(Debug)]
pub enum DbError {
    /// Connection setup or a schema query failed.
    Sqlite(rusqlite::Error),
    /// Migration `version` could not be applied; the schema was left as is.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build with a schema this one cannot read.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "document database error: {err}"),
            Self::Migration { version, source } => {
                write!(f, "document schema migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "document schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
