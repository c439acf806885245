//! Explicit partial-update payloads.
//!
//! `None` means "leave unchanged"; presence of a field is a typed fact, never
//! inferred from key existence.

use crate::model::event::{Attendance, TermId};
use std::collections::BTreeMap;

/// Partial update for event-level fields.
///
/// `fixed: Some(Some(id))` fixes the event to a term, `Some(None)` unfixes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fixed: Option<Option<TermId>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.fixed.is_none()
    }

    /// Returns whether title or description is supplied.
    pub fn touches_details(&self) -> bool {
        self.title.is_some() || self.description.is_some()
    }
}

/// Partial update for one participant: optional rename plus cell overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantPatch {
    pub name: Option<String>,
    pub cells: BTreeMap<TermId, Attendance>,
}

impl ParticipantPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.cells.is_empty()
    }
}

/// Partial update for one comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPatch {
    pub name: Option<String>,
    pub body: Option<String>,
}

impl CommentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.body.is_none()
    }
}
