//! Comment operations of the event engine.
//!
//! Comments ignore the fixed state: they can be added, edited and removed on
//! open and fixed events alike.

use crate::model::event::{Comment, CommentId, EventId, Presence};
use crate::model::patch::CommentPatch;
use crate::model::view::EventView;
use crate::repo::document_store::DocumentStore;
use crate::service::error::{EventError, EventResult};
use crate::service::event_service::EventService;

impl<S: DocumentStore> EventService<S> {
    /// Appends a comment.
    ///
    /// # Errors
    /// - `NotFound`.
    pub fn add_comment(
        &self,
        id: EventId,
        name: impl Into<String>,
        body: impl Into<String>,
    ) -> EventResult<EventView> {
        let comment = Comment {
            name: name.into(),
            body: body.into(),
        };
        self.mutate("comment_add", id, |event| {
            event.comments.insert_next(comment);
            Ok(())
        })
    }

    /// Edits the supplied fields of a live comment. An empty patch returns the
    /// current view.
    ///
    /// # Errors
    /// - `NotFound`, `CommentNotFound { deleted }`.
    pub fn update_comment(
        &self,
        id: EventId,
        comment_id: CommentId,
        patch: CommentPatch,
    ) -> EventResult<EventView> {
        self.mutate("comment_update", id, |event| {
            if patch.is_empty() {
                return Ok(());
            }

            let presence = event.comments.classify(comment_id);
            let Some(comment) = event.comments.get_mut(comment_id) else {
                return Err(EventError::CommentNotFound {
                    deleted: presence.is_deleted(),
                });
            };
            if let Some(name) = patch.name {
                comment.name = name;
            }
            if let Some(body) = patch.body {
                comment.body = body;
            }
            Ok(())
        })
    }

    /// Removes a comment.
    ///
    /// # Errors
    /// - `NotFound`.
    /// - `CommentNotFound { deleted: false }` when the id was never allocated.
    pub fn delete_comment(&self, id: EventId, comment_id: CommentId) -> EventResult<EventView> {
        self.mutate("comment_delete", id, |event| {
            match event.comments.classify(comment_id) {
                Presence::Live => {
                    event.comments.remove(comment_id);
                    Ok(())
                }
                Presence::Deleted => Ok(()),
                Presence::NeverExisted => Err(EventError::CommentNotFound { deleted: false }),
            }
        })
    }
}
