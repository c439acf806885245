//! Document store abstraction and implementations.
//!
//! # Responsibility
//! - Define the key-value document contract the event engine depends on.
//! - Keep SQLite details out of service orchestration.
//!
//! # Invariants
//! - Every implementation reports `NotFound { deleted }` through the same
//!   sequence classification.

pub mod document_store;
pub mod memory_store;
pub mod sqlite_store;
