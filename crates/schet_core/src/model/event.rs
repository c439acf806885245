//! Event aggregate domain model.
//!
//! # Responsibility
//! - Define the stored shape of one scheduling event and its sub-entities.
//! - Provide counter-backed sub-collections with stable, never-reused ids.
//! - Classify ids as live, deleted or never allocated.
//!
//! # Invariants
//! - Sub-collection counters only increase; ids are allocated as `counter + 1`.
//! - An absent id `<= counter` was deleted; an id `> counter` never existed.
//! - `record` holds one cell per live `(participant, term)` pair and no others.
//! - `fixed`, when set, names a term id in this same aggregate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Sequential event id assigned by the document store.
pub type EventId = u64;
/// Per-event term id.
pub type TermId = u64;
/// Per-event participant id.
pub type ParticipantId = u64;
/// Per-event comment id.
pub type CommentId = u64;

/// Attendance matrix: participant id -> term id -> cell value.
pub type Record = BTreeMap<ParticipantId, BTreeMap<TermId, Attendance>>;

/// One attendance cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attendance {
    Presence,
    Absence,
    Uncertain,
}

impl Attendance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::Absence => "absence",
            Self::Uncertain => "uncertain",
        }
    }
}

impl Display for Attendance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attendance {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "presence" => Ok(Self::Presence),
            "absence" => Ok(Self::Absence),
            "uncertain" => Ok(Self::Uncertain),
            other => Err(format!(
                "unsupported attendance `{other}`; expected presence|absence|uncertain"
            )),
        }
    }
}

/// Lifecycle classification of a counter-allocated id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Currently present.
    Live,
    /// Allocated once, since removed.
    Deleted,
    /// Never allocated.
    NeverExisted,
}

impl Presence {
    pub fn is_live(self) -> bool {
        self == Self::Live
    }

    pub fn is_deleted(self) -> bool {
        self == Self::Deleted
    }
}

/// Classifies `id` against an allocation counter.
///
/// Shared by the document store (collection sequences) and the aggregate
/// (sub-collection counters).
pub fn classify(id: u64, counter: u64, exists: bool) -> Presence {
    if exists {
        Presence::Live
    } else if (1..=counter).contains(&id) {
        Presence::Deleted
    } else {
        Presence::NeverExisted
    }
}

/// Id-keyed collection with a monotonic allocation counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct SubCollection<T> {
    #[serde(default)]
    counter: u64,
    #[serde(default)]
    items: BTreeMap<u64, T>,
}

impl<T> Default for SubCollection<T> {
    fn default() -> Self {
        Self {
            counter: 0,
            items: BTreeMap::new(),
        }
    }
}

impl<T> SubCollection<T> {
    /// Highest id ever allocated.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.items.contains_key(&id)
    }

    pub fn classify(&self, id: u64) -> Presence {
        classify(id, self.counter, self.contains(id))
    }

    /// Stores `value` under a freshly allocated id and returns that id.
    pub fn insert_next(&mut self, value: T) -> u64 {
        self.counter += 1;
        self.items.insert(self.counter, value);
        self.counter
    }

    /// Replaces the value of a live id. Returns `None` and does nothing when
    /// `id` is not live.
    pub fn replace(&mut self, id: u64, value: T) -> Option<T> {
        let slot = self.items.get_mut(&id)?;
        Some(std::mem::replace(slot, value))
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    /// Removes `id`; the counter is left untouched.
    pub fn remove(&mut self, id: u64) -> Option<T> {
        self.items.remove(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.items.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> + '_ {
        self.items.iter().map(|(id, value)| (*id, value))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Live items without the counter.
    pub fn items(&self) -> &BTreeMap<u64, T> {
        &self.items
    }
}

impl<T: PartialEq> SubCollection<T> {
    /// Returns the first live id holding `value`, excluding `except`.
    pub fn find_other(&self, value: &T, except: Option<u64>) -> Option<u64> {
        self.iter()
            .find(|(id, existing)| Some(*id) != except && *existing == value)
            .map(|(id, _)| id)
    }
}

/// One comment left on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub name: String,
    pub body: String,
}

/// Stored event aggregate, including allocation counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Chosen term. Presence locks the schedule shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<TermId>,
    #[serde(default)]
    pub terms: SubCollection<String>,
    #[serde(default)]
    pub participants: SubCollection<String>,
    #[serde(default)]
    pub record: Record,
    #[serde(default)]
    pub comments: SubCollection<Comment>,
}

impl Event {
    /// Creates an open event with empty sub-collections.
    pub fn new(id: EventId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            fixed: None,
            terms: SubCollection::default(),
            participants: SubCollection::default(),
            record: Record::new(),
            comments: SubCollection::default(),
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// Returns whether every live `(participant, term)` pair has exactly one
    /// cell and no cell references a removed participant or term.
    pub fn record_is_complete(&self) -> bool {
        if self.record.len() != self.participants.len() {
            return false;
        }

        self.participants.ids().all(|participant_id| {
            self.record.get(&participant_id).is_some_and(|row| {
                row.len() == self.terms.len()
                    && self.terms.ids().all(|term_id| row.contains_key(&term_id))
            })
        })
    }
}
