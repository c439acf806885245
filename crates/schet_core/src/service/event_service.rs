//! Event aggregate engine: event-level operations.
//!
//! # Responsibility
//! - Load one event document, apply a validated in-memory mutation, and write
//!   back only the changed top-level fields.
//! - Enforce the Open/Fixed state machine.
//! - Emit one metadata-only log line per operation.
//!
//! # Invariants
//! - Every operation reads the event first; a missing event yields
//!   `NotFound { deleted }` before any other check.
//! - Failed operations never write.
//! - Results are `EventView`s, so counters never leave the engine.
//!
//! # Concurrency
//! Each operation is one `read` followed by at most one `set` and one
//! `unset`. Nothing serializes that pair, so two concurrent writers on the
//! same event id can lose an update. Single documents stay consistent because
//! each store call is atomic.

use crate::model::event::{Event, EventId, TermId};
use crate::model::patch::EventPatch;
use crate::model::view::EventView;
use crate::repo::document_store::{Document, DocumentDiff, DocumentStore, StoreError, ID_KEY};
use crate::service::error::{EventError, EventResult};
use log::{error, info, warn};
use serde_json::Value;
use std::time::Instant;

/// Collection holding event documents.
pub const EVENTS_COLLECTION: &str = "events";

/// Event engine over any [`DocumentStore`].
pub struct EventService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> EventService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates an open event with empty sub-collections.
    ///
    /// Title and description are stored as given.
    pub fn create(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> EventResult<EventView> {
        let started = Instant::now();
        let result = self.create_inner(title.into(), description.into());
        match &result {
            Ok(view) => info!(
                "event=event_create module=event_service status=ok event_id={} duration_ms={}",
                view.id,
                started.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=event_create module=event_service status=error error={} duration_ms={}",
                err.error_name(),
                started.elapsed().as_millis()
            ),
        }
        result
    }

    /// Returns the current view of one event.
    pub fn get(&self, id: EventId) -> EventResult<EventView> {
        self.observe("event_get", id, || {
            let (_, event) = self.load(id)?;
            Ok(EventView::from(event))
        })
    }

    /// Merges title and/or description into an open event.
    ///
    /// An empty patch on an open event succeeds without writing.
    ///
    /// # Errors
    /// - `InvalidParameter` when the patch carries `fixed`; use [`Self::put`].
    /// - `NotFound`, `FixedEvent`.
    pub fn update(&self, id: EventId, patch: EventPatch) -> EventResult<EventView> {
        if patch.fixed.is_some() {
            return Err(EventError::InvalidParameter(
                "update does not accept `fixed`".to_string(),
            ));
        }

        self.mutate("event_update", id, |event| {
            ensure_open(event)?;
            if let Some(title) = patch.title {
                event.title = title;
            }
            if let Some(description) = patch.description {
                event.description = description;
            }
            Ok(())
        })
    }

    /// Dispatches a combined patch: `fixed` routes to [`Self::fix`] or
    /// [`Self::unfix`], anything else to [`Self::update`].
    ///
    /// # Errors
    /// - `InvalidParameter` when `fixed` is combined with title/description.
    pub fn put(&self, id: EventId, patch: EventPatch) -> EventResult<EventView> {
        match patch.fixed {
            Some(_) if patch.touches_details() => Err(EventError::InvalidParameter(
                "`fixed` cannot be combined with title or description".to_string(),
            )),
            Some(Some(term_id)) => self.fix(id, term_id),
            Some(None) => self.unfix(id),
            None => self.update(id, patch),
        }
    }

    /// Locks the schedule to one live term.
    ///
    /// # Errors
    /// - `NotFound`, `FixedEvent`.
    /// - `TermNotFound { deleted }` when `term_id` is not live.
    pub fn fix(&self, id: EventId, term_id: TermId) -> EventResult<EventView> {
        self.mutate("event_fix", id, |event| {
            ensure_open(event)?;
            let presence = event.terms.classify(term_id);
            if !presence.is_live() {
                return Err(EventError::TermNotFound {
                    deleted: presence.is_deleted(),
                });
            }
            event.fixed = Some(term_id);
            Ok(())
        })
    }

    /// Clears `fixed`. Unfixing an open event succeeds without writing.
    pub fn unfix(&self, id: EventId) -> EventResult<EventView> {
        self.mutate("event_unfix", id, |event| {
            event.fixed = None;
            Ok(())
        })
    }

    /// Removes the event and all of its sub-state.
    pub fn delete(&self, id: EventId) -> EventResult<()> {
        self.observe("event_delete", id, || {
            self.store.delete(EVENTS_COLLECTION, id)?;
            Ok(())
        })
    }

    fn create_inner(&self, title: String, description: String) -> EventResult<EventView> {
        let mut document = encode(&Event::new(0, title, description))?;
        document.remove(ID_KEY);

        let (id, stored) = self.store.create(EVENTS_COLLECTION, document)?;
        let event = decode(stored)?;
        if event.id != id {
            return Err(EventError::Server(StoreError::InvalidData(format!(
                "created event carries id {} instead of {id}",
                event.id
            ))));
        }
        Ok(EventView::from(event))
    }

    /// Runs one read-modify-write cycle under a log scope.
    pub(crate) fn mutate<F>(
        &self,
        operation: &'static str,
        id: EventId,
        apply: F,
    ) -> EventResult<EventView>
    where
        F: FnOnce(&mut Event) -> EventResult<()>,
    {
        self.observe(operation, id, || {
            let (before, mut event) = self.load(id)?;
            apply(&mut event)?;
            self.commit(id, &before, &event)
        })
    }

    pub(crate) fn observe<T, F>(
        &self,
        operation: &'static str,
        id: EventId,
        run: F,
    ) -> EventResult<T>
    where
        F: FnOnce() -> EventResult<T>,
    {
        let started = Instant::now();
        let result = run();
        let duration_ms = started.elapsed().as_millis();

        match &result {
            Ok(_) => info!(
                "event={operation} module=event_service status=ok event_id={id} duration_ms={duration_ms}"
            ),
            Err(err @ EventError::Server(_)) => error!(
                "event={operation} module=event_service status=error event_id={id} error={} duration_ms={duration_ms}",
                err.error_name()
            ),
            Err(err) => warn!(
                "event={operation} module=event_service status=error event_id={id} error={} duration_ms={duration_ms}",
                err.error_name()
            ),
        }
        result
    }

    fn load(&self, id: EventId) -> EventResult<(Document, Event)> {
        let document = self.store.read(EVENTS_COLLECTION, id)?;
        let event = decode(document.clone())?;
        Ok((document, event))
    }

    /// Writes the top-level difference between `before` and `event`.
    fn commit(&self, id: EventId, before: &Document, event: &Event) -> EventResult<EventView> {
        let after = encode(event)?;
        let diff = DocumentDiff::between(before, &after);
        if diff.is_empty() {
            return Ok(EventView::from(event));
        }

        let mut stored = None;
        if !diff.set.is_empty() {
            stored = Some(self.store.set(EVENTS_COLLECTION, id, diff.set)?);
        }
        if !diff.unset.is_empty() {
            stored = Some(self.store.unset(EVENTS_COLLECTION, id, &diff.unset)?);
        }

        match stored {
            Some(document) => Ok(EventView::from(decode(document)?)),
            None => Ok(EventView::from(event)),
        }
    }
}

pub(crate) fn ensure_open(event: &Event) -> EventResult<()> {
    if event.is_fixed() {
        return Err(EventError::FixedEvent);
    }
    Ok(())
}

fn encode(event: &Event) -> EventResult<Document> {
    match serde_json::to_value(event).map_err(StoreError::from)? {
        Value::Object(document) => Ok(document),
        other => Err(EventError::Server(StoreError::InvalidData(format!(
            "event encoded as non-object: {other}"
        )))),
    }
}

fn decode(document: Document) -> EventResult<Event> {
    serde_json::from_value(Value::Object(document))
        .map_err(|err| EventError::Server(StoreError::from(err)))
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use crate::model::event::{Attendance, Event};

    #[test]
    fn stored_document_uses_counter_and_items_layout() {
        let mut event = Event::new(4, "retro", "");
        let term_id = event.terms.insert_next("2014-01-01".to_string());
        let participant_id = event.participants.insert_next("alice".to_string());
        event
            .record
            .entry(participant_id)
            .or_default()
            .insert(term_id, Attendance::Presence);

        let document = encode(&event).expect("event should encode");
        assert_eq!(
            serde_json::Value::Object(document.clone()),
            serde_json::json!({
                "id": 4,
                "title": "retro",
                "description": "",
                "terms": {"counter": 1, "items": {"1": "2014-01-01"}},
                "participants": {"counter": 1, "items": {"1": "alice"}},
                "record": {"1": {"1": "presence"}},
                "comments": {"counter": 0, "items": {}}
            })
        );
        assert_eq!(decode(document).expect("document should decode"), event);
    }

    #[test]
    fn decode_rejects_malformed_documents() {
        let document = serde_json::json!({"id": "x", "title": 3})
            .as_object()
            .cloned()
            .expect("literal should be an object");
        assert!(decode(document).is_err());
    }
}
