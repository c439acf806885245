//! Core domain logic for Schet group scheduling.
//! This crate is the single source of truth for event invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod temporal;

pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::event::{
    classify, Attendance, Comment, CommentId, Event, EventId, ParticipantId, Presence, Record,
    SubCollection, TermId,
};
pub use model::patch::{CommentPatch, EventPatch, ParticipantPatch};
pub use model::view::EventView;
pub use repo::document_store::{Document, DocumentStore, StoreError, StoreResult};
pub use repo::memory_store::MemoryDocumentStore;
pub use repo::sqlite_store::SqliteDocumentStore;
pub use service::{EventError, EventResult, EventService};
pub use temporal::{TemporalError, TemporalResult, TermRange, TermShape};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
