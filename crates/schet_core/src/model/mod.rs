//! Event aggregate domain model.
//!
//! # Responsibility
//! - Define the stored aggregate shape and its caller-visible projection.
//! - Define explicit patch payloads for partial updates.
//!
//! # Invariants
//! - The event exclusively owns terms, participants, record and comments.
//! - Sub-entity ids are allocated from per-event counters and never reused.

pub mod event;
pub mod patch;
pub mod view;
