//! Temporal range engine for schedule terms.
//!
//! # Responsibility
//! - Validate and order ISO 8601 term strings (`range`).
//! - Translate between human-entry local formats and ISO terms (`pretty`).
//!
//! # Invariants
//! - All functions are pure and never touch storage.
//! - Stored terms are always ISO strings in UTC; offsets exist only at the
//!   presentation boundary.

pub mod pretty;
pub mod range;

pub use pretty::{normalize, prettify};
pub use range::{compare, validate, TemporalError, TemporalResult, TermRange, TermShape};
