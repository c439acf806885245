//! Caller-visible event projection.
//!
//! # Invariants
//! - Allocation counters never appear in a view.
//! - Views are detached snapshots; mutating one never touches storage.

use crate::model::event::{
    Comment, CommentId, Event, EventId, ParticipantId, Record, SubCollection, TermId,
};
use crate::temporal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Event aggregate with bookkeeping counters stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventView {
    pub id: EventId,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<TermId>,
    pub terms: BTreeMap<TermId, String>,
    pub participants: BTreeMap<ParticipantId, String>,
    pub record: Record,
    pub comments: BTreeMap<CommentId, Comment>,
}

impl EventView {
    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// Terms in display order: by normalized instant, then by term id.
    pub fn sorted_terms(&self) -> Vec<(TermId, &str)> {
        let mut terms: Vec<(TermId, &str)> = self
            .terms
            .iter()
            .map(|(id, value)| (*id, value.as_str()))
            .collect();
        terms.sort_by(|(left_id, left), (right_id, right)| {
            temporal::compare(left, right).then_with(|| left_id.cmp(right_id))
        });
        terms
    }
}

impl From<&Event> for EventView {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            fixed: event.fixed,
            terms: live_items(&event.terms),
            participants: live_items(&event.participants),
            record: event.record.clone(),
            comments: live_items(&event.comments),
        }
    }
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self::from(&event)
    }
}

fn live_items<T: Clone>(collection: &SubCollection<T>) -> BTreeMap<u64, T> {
    collection.items().clone()
}
