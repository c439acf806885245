//! Event aggregate engine.
//!
//! # Responsibility
//! - Orchestrate document store calls into event use-cases.
//! - Keep transport layers decoupled from storage details.
//!
//! Operations are split by sub-entity; all of them live on [`EventService`].

pub mod comment_service;
pub mod error;
pub mod event_service;
pub mod participant_service;
pub mod term_service;

pub use error::{EventError, EventResult};
pub use event_service::{EventService, EVENTS_COLLECTION};
