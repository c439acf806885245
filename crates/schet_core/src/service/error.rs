//! Event engine error taxonomy.
//!
//! # Invariants
//! - Every `*NotFound` kind carries the deleted/never-existed split.
//! - Store failures other than a missing event surface as `Server`.

use crate::repo::document_store::StoreError;
use crate::temporal::TemporalError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EventResult<T> = Result<T, EventError>;

/// Closed set of failures returned by [`crate::service::EventService`].
#[derive(Debug)]
pub enum EventError {
    /// Storage failed or returned undecodable data.
    Server(StoreError),
    /// Caller supplied an illegal combination or an invalid term.
    InvalidParameter(String),
    /// Event is absent.
    NotFound { deleted: bool },
    /// Schedule-shape mutation attempted on a fixed event.
    FixedEvent,
    TermNotFound { deleted: bool },
    ParticipantNotFound { deleted: bool },
    CommentNotFound { deleted: bool },
    DuplicatedTerm,
    DuplicatedParticipant,
}

impl EventError {
    /// Stable wire name used in `{"error": "<name>"}` bodies.
    pub fn error_name(&self) -> &'static str {
        match self {
            Self::Server(_) => "ServerSideError",
            Self::InvalidParameter(_) => "InvalidParameterError",
            Self::NotFound { .. } => "NotFoundError",
            Self::FixedEvent => "FixedEventError",
            Self::TermNotFound { .. } => "TermNotFoundError",
            Self::ParticipantNotFound { .. } => "ParticipantNotFoundError",
            Self::CommentNotFound { .. } => "CommentNotFoundError",
            Self::DuplicatedTerm => "DuplicatedTermError",
            Self::DuplicatedParticipant => "DuplicatedParticipantError",
        }
    }

    /// HTTP status a transport should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Server(_) => 500,
            Self::InvalidParameter(_) => 400,
            Self::NotFound { deleted }
            | Self::TermNotFound { deleted }
            | Self::ParticipantNotFound { deleted }
            | Self::CommentNotFound { deleted } => {
                if *deleted {
                    410
                } else {
                    404
                }
            }
            Self::FixedEvent | Self::DuplicatedTerm | Self::DuplicatedParticipant => 409,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::TermNotFound { .. }
                | Self::ParticipantNotFound { .. }
                | Self::CommentNotFound { .. }
        )
    }
}

impl Display for EventError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server(err) => write!(f, "server side error: {err}"),
            Self::InvalidParameter(message) => write!(f, "invalid parameter: {message}"),
            Self::NotFound { deleted } => write!(f, "event {}", absence(*deleted)),
            Self::FixedEvent => write!(f, "event is fixed"),
            Self::TermNotFound { deleted } => write!(f, "term {}", absence(*deleted)),
            Self::ParticipantNotFound { deleted } => {
                write!(f, "participant {}", absence(*deleted))
            }
            Self::CommentNotFound { deleted } => write!(f, "comment {}", absence(*deleted)),
            Self::DuplicatedTerm => write!(f, "term already exists"),
            Self::DuplicatedParticipant => write!(f, "participant already exists"),
        }
    }
}

fn absence(deleted: bool) -> &'static str {
    if deleted {
        "has been deleted"
    } else {
        "not found"
    }
}

impl Error for EventError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Server(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for EventError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { deleted, .. } => Self::NotFound { deleted },
            other => Self::Server(other),
        }
    }
}

impl From<TemporalError> for EventError {
    fn from(value: TemporalError) -> Self {
        Self::InvalidParameter(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::EventError;
    use crate::repo::document_store::StoreError;
    use crate::temporal::TemporalError;

    #[test]
    fn store_not_found_keeps_deleted_flag() {
        let deleted = EventError::from(StoreError::NotFound {
            collection: "events".to_string(),
            id: 3,
            deleted: true,
        });
        assert!(matches!(deleted, EventError::NotFound { deleted: true }));
        assert_eq!(deleted.http_status(), 410);

        let unavailable = EventError::from(StoreError::Unavailable("down".to_string()));
        assert!(matches!(unavailable, EventError::Server(_)));
        assert_eq!(unavailable.error_name(), "ServerSideError");
        assert_eq!(unavailable.http_status(), 500);
    }

    #[test]
    fn temporal_errors_become_invalid_parameter() {
        let error = EventError::from(TemporalError::InvalidValue("2014-02-30".to_string()));
        assert_eq!(error.error_name(), "InvalidParameterError");
        assert_eq!(error.http_status(), 400);
    }

    #[test]
    fn conflicts_map_to_409_and_sub_entity_misses_split_404_410() {
        assert_eq!(EventError::FixedEvent.http_status(), 409);
        assert_eq!(EventError::DuplicatedTerm.http_status(), 409);
        assert_eq!(
            EventError::TermNotFound { deleted: false }.http_status(),
            404
        );
        assert_eq!(
            EventError::CommentNotFound { deleted: true }.http_status(),
            410
        );
        assert_eq!(
            EventError::DuplicatedParticipant.error_name(),
            "DuplicatedParticipantError"
        );
    }

    #[test]
    fn is_not_found_covers_event_and_sub_entity_misses() {
        assert!(EventError::NotFound { deleted: true }.is_not_found());
        assert!(EventError::TermNotFound { deleted: false }.is_not_found());
        assert!(EventError::ParticipantNotFound { deleted: true }.is_not_found());
        assert!(EventError::CommentNotFound { deleted: false }.is_not_found());
        assert!(!EventError::FixedEvent.is_not_found());
        assert!(!EventError::DuplicatedTerm.is_not_found());
        assert!(!EventError::InvalidParameter("x".to_string()).is_not_found());
    }
}
