//! Participant operations of the event engine.
//!
//! # Invariants
//! - Participant names are unique among live participants.
//! - A new participant row covers every live term; unspecified cells are
//!   `absence`.
//! - Cell overrides naming a term that is not live are ignored.

use crate::model::event::{Attendance, Event, EventId, ParticipantId, Presence, TermId};
use crate::model::patch::ParticipantPatch;
use crate::model::view::EventView;
use crate::repo::document_store::DocumentStore;
use crate::service::error::{EventError, EventResult};
use crate::service::event_service::{ensure_open, EventService};
use std::collections::BTreeMap;

impl<S: DocumentStore> EventService<S> {
    /// Registers a participant with a full record row.
    ///
    /// # Errors
    /// - `NotFound`, `FixedEvent`, `DuplicatedParticipant`.
    pub fn add_participant(
        &self,
        id: EventId,
        name: impl Into<String>,
        cells: &BTreeMap<TermId, Attendance>,
    ) -> EventResult<EventView> {
        let name = name.into();
        self.mutate("participant_add", id, |event| {
            ensure_open(event)?;
            if event.participants.find_other(&name, None).is_some() {
                return Err(EventError::DuplicatedParticipant);
            }

            let row = event
                .terms
                .ids()
                .map(|term_id| {
                    let cell = cells.get(&term_id).copied().unwrap_or(Attendance::Absence);
                    (term_id, cell)
                })
                .collect();
            let participant_id = event.participants.insert_next(name);
            event.record.insert(participant_id, row);
            Ok(())
        })
    }

    /// Renames a participant and/or overwrites their cells.
    ///
    /// An empty patch returns the current view even on a fixed event.
    ///
    /// # Errors
    /// - `NotFound`, `FixedEvent`, `ParticipantNotFound { deleted }`,
    ///   `DuplicatedParticipant`.
    pub fn update_participant(
        &self,
        id: EventId,
        participant_id: ParticipantId,
        patch: ParticipantPatch,
    ) -> EventResult<EventView> {
        self.mutate("participant_update", id, |event| {
            if patch.is_empty() {
                return Ok(());
            }
            ensure_open(event)?;
            require_participant(event, participant_id)?;

            if let Some(name) = patch.name {
                if event
                    .participants
                    .find_other(&name, Some(participant_id))
                    .is_some()
                {
                    return Err(EventError::DuplicatedParticipant);
                }
                event.participants.replace(participant_id, name);
            }

            let live_cells: Vec<_> = patch
                .cells
                .into_iter()
                .filter(|(term_id, _)| event.terms.contains(*term_id))
                .collect();
            let row = event.record.entry(participant_id).or_default();
            row.extend(live_cells);
            Ok(())
        })
    }

    /// Removes a participant and their record row.
    ///
    /// # Errors
    /// - `NotFound`, `FixedEvent`.
    /// - `ParticipantNotFound { deleted: false }` when the id was never
    ///   allocated.
    pub fn delete_participant(
        &self,
        id: EventId,
        participant_id: ParticipantId,
    ) -> EventResult<EventView> {
        self.mutate("participant_delete", id, |event| {
            ensure_open(event)?;
            match event.participants.classify(participant_id) {
                Presence::Live => {
                    event.participants.remove(participant_id);
                    event.record.remove(&participant_id);
                    Ok(())
                }
                Presence::Deleted => Ok(()),
                Presence::NeverExisted => Err(EventError::ParticipantNotFound { deleted: false }),
            }
        })
    }
}

fn require_participant(event: &Event, participant_id: ParticipantId) -> EventResult<()> {
    let presence = event.participants.classify(participant_id);
    if presence.is_live() {
        Ok(())
    } else {
        Err(EventError::ParticipantNotFound {
            deleted: presence.is_deleted(),
        })
    }
}
