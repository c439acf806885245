//! Term operations of the event engine.
//!
//! # Invariants
//! - Term values are valid ISO terms and unique by raw string equality.
//! - Every live participant row has exactly one cell per live term.
//! - Deleting an already deleted term is a successful no-op.

use crate::model::event::{Attendance, Event, EventId, Presence, TermId};
use crate::model::view::EventView;
use crate::repo::document_store::DocumentStore;
use crate::service::error::{EventError, EventResult};
use crate::service::event_service::{ensure_open, EventService};
use crate::temporal::TermRange;

impl<S: DocumentStore> EventService<S> {
    /// Proposes a new term and gives every live participant an `absence`
    /// cell for it.
    ///
    /// # Errors
    /// - `InvalidParameter` when `value` is not a valid ISO term.
    /// - `NotFound`, `FixedEvent`, `DuplicatedTerm`.
    pub fn add_term(&self, id: EventId, value: impl Into<String>) -> EventResult<EventView> {
        let value = value.into();
        self.mutate("term_add", id, |event| {
            ensure_open(event)?;
            check_term(&value)?;
            if event.terms.find_other(&value, None).is_some() {
                return Err(EventError::DuplicatedTerm);
            }

            let term_id = event.terms.insert_next(value);
            add_term_column(event, term_id);
            Ok(())
        })
    }

    /// Replaces the value of a live term. Setting a term to its current value
    /// succeeds without writing.
    ///
    /// # Errors
    /// - `InvalidParameter` when `value` is not a valid ISO term.
    /// - `NotFound`, `FixedEvent`, `TermNotFound { deleted }`,
    ///   `DuplicatedTerm`.
    pub fn update_term(
        &self,
        id: EventId,
        term_id: TermId,
        value: impl Into<String>,
    ) -> EventResult<EventView> {
        let value = value.into();
        self.mutate("term_update", id, |event| {
            ensure_open(event)?;
            check_term(&value)?;
            require_term(event, term_id)?;
            if event.terms.find_other(&value, Some(term_id)).is_some() {
                return Err(EventError::DuplicatedTerm);
            }

            event.terms.replace(term_id, value);
            Ok(())
        })
    }

    /// Removes a term and its column from every record row.
    ///
    /// # Errors
    /// - `NotFound`, `FixedEvent`.
    /// - `TermNotFound { deleted: false }` when `term_id` was never allocated.
    pub fn delete_term(&self, id: EventId, term_id: TermId) -> EventResult<EventView> {
        self.mutate("term_delete", id, |event| {
            ensure_open(event)?;
            match event.terms.classify(term_id) {
                Presence::Live => {
                    event.terms.remove(term_id);
                    for row in event.record.values_mut() {
                        row.remove(&term_id);
                    }
                    Ok(())
                }
                Presence::Deleted => Ok(()),
                Presence::NeverExisted => Err(EventError::TermNotFound { deleted: false }),
            }
        })
    }
}

fn check_term(value: &str) -> EventResult<()> {
    TermRange::parse(value)?;
    Ok(())
}

fn require_term(event: &Event, term_id: TermId) -> EventResult<()> {
    let presence = event.terms.classify(term_id);
    if presence.is_live() {
        Ok(())
    } else {
        Err(EventError::TermNotFound {
            deleted: presence.is_deleted(),
        })
    }
}

fn add_term_column(event: &mut Event, term_id: TermId) {
    let participant_ids: Vec<_> = event.participants.ids().collect();
    for participant_id in participant_ids {
        event
            .record
            .entry(participant_id)
            .or_default()
            .insert(term_id, Attendance::Absence);
    }
}
