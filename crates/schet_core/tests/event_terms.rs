use schet_core::service::EVENTS_COLLECTION;
use schet_core::{Attendance, DocumentStore, EventError, EventService, MemoryDocumentStore};
use std::collections::BTreeMap;

fn service_with_event() -> EventService<MemoryDocumentStore> {
    let service = EventService::new(MemoryDocumentStore::new());
    service.create("planning", "").unwrap();
    service
}

#[test]
fn add_term_allocates_increasing_ids() {
    let service = service_with_event();

    service.add_term(1, "2014-01-01").unwrap();
    service.add_term(1, "2014-01-02").unwrap();
    let view = service.add_term(1, "2014-01-03T09:00Z/2014-01-03T10:00Z").unwrap();

    let ids: Vec<u64> = view.terms.keys().copied().collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(view.terms[&3], "2014-01-03T09:00Z/2014-01-03T10:00Z");
}

#[test]
fn add_term_rejects_raw_duplicates_only() {
    let service = service_with_event();
    service.add_term(1, "2014-01-01").unwrap();

    assert!(matches!(
        service.add_term(1, "2014-01-01"),
        Err(EventError::DuplicatedTerm)
    ));

    // Same instant, different spelling: a distinct term.
    let view = service.add_term(1, "2014-01-01T00:00Z").unwrap();
    assert_eq!(view.terms.len(), 2);
}

#[test]
fn add_term_rejects_invalid_values() {
    let service = service_with_event();

    for value in ["2014-02-30", "2014/01/01", "2014-01-02/2014-01-01", ""] {
        let err = service.add_term(1, value).unwrap_err();
        assert!(matches!(err, EventError::InvalidParameter(_)), "{value}");
    }
    assert!(service.get(1).unwrap().terms.is_empty());
}

#[test]
fn add_term_on_missing_event_reports_not_found() {
    let service = service_with_event();
    assert!(matches!(
        service.add_term(2, "2014-01-01"),
        Err(EventError::NotFound { deleted: false })
    ));
}

#[test]
fn add_term_appends_absence_cells_to_every_row() {
    let service = service_with_event();
    service.add_term(1, "2014-01-01").unwrap();
    let cells = BTreeMap::from([(1, Attendance::Presence)]);
    service.add_participant(1, "alice", &cells).unwrap();
    service.add_participant(1, "bob", &BTreeMap::new()).unwrap();

    let view = service.add_term(1, "2014-01-02").unwrap();

    assert_eq!(
        view.record[&1],
        BTreeMap::from([(1, Attendance::Presence), (2, Attendance::Absence)])
    );
    assert_eq!(
        view.record[&2],
        BTreeMap::from([(1, Attendance::Absence), (2, Attendance::Absence)])
    );
}

#[test]
fn update_term_replaces_value_and_checks_duplicates_among_terms() {
    let service = service_with_event();
    service.add_term(1, "2014-01-01").unwrap();
    service.add_term(1, "2014-01-02").unwrap();
    service.add_participant(1, "2014-01-05", &BTreeMap::new()).unwrap();

    assert!(matches!(
        service.update_term(1, 2, "2014-01-01"),
        Err(EventError::DuplicatedTerm)
    ));

    // A participant name equal to the new value is not a term conflict.
    let view = service.update_term(1, 2, "2014-01-05").unwrap();
    assert_eq!(view.terms[&2], "2014-01-05");
    assert_eq!(view.record[&1].len(), 2);
}

#[test]
fn update_term_to_same_value_is_a_no_op() {
    let service = service_with_event();
    let before = service.add_term(1, "2014-01-01").unwrap();
    let stored_before = service.store().read(EVENTS_COLLECTION, 1).unwrap();

    let after = service.update_term(1, 1, "2014-01-01").unwrap();

    assert_eq!(after, before);
    assert_eq!(
        service.store().read(EVENTS_COLLECTION, 1).unwrap(),
        stored_before
    );
}

#[test]
fn update_term_reports_missing_terms_and_invalid_values() {
    let service = service_with_event();
    service.add_term(1, "2014-01-01").unwrap();
    service.add_term(1, "2014-01-02").unwrap();
    service.delete_term(1, 2).unwrap();

    assert!(matches!(
        service.update_term(1, 2, "2014-01-03"),
        Err(EventError::TermNotFound { deleted: true })
    ));
    assert!(matches!(
        service.update_term(1, 3, "2014-01-03"),
        Err(EventError::TermNotFound { deleted: false })
    ));
    assert!(matches!(
        service.update_term(1, 1, "2014-13-01"),
        Err(EventError::InvalidParameter(_))
    ));
}

#[test]
fn delete_term_prunes_record_column_and_is_idempotent() {
    let service = service_with_event();
    service.add_term(1, "2014-01-01").unwrap();
    service.add_term(1, "2014-01-02").unwrap();
    service.add_participant(1, "alice", &BTreeMap::new()).unwrap();

    let first = service.delete_term(1, 1).unwrap();
    let second = service.delete_term(1, 1).unwrap();

    assert_eq!(first, second);
    assert!(!first.terms.contains_key(&1));
    assert_eq!(
        first.record[&1],
        BTreeMap::from([(2, Attendance::Absence)])
    );
}

#[test]
fn delete_term_beyond_counter_is_an_error() {
    let service = service_with_event();
    service.add_term(1, "2014-01-01").unwrap();

    assert!(matches!(
        service.delete_term(1, 2),
        Err(EventError::TermNotFound { deleted: false })
    ));
}

#[test]
fn term_ids_are_never_reused() {
    let service = service_with_event();
    service.add_term(1, "2014-01-01").unwrap();
    service.add_term(1, "2014-01-02").unwrap();
    service.delete_term(1, 2).unwrap();

    let view = service.add_term(1, "2014-01-02").unwrap();

    let ids: Vec<u64> = view.terms.keys().copied().collect();
    assert_eq!(ids, vec![1, 3]);
    let stored = service.store().read(EVENTS_COLLECTION, 1).unwrap();
    assert_eq!(stored["terms"]["counter"], 3);
}

#[test]
fn sorted_terms_follow_chronology_not_ids() {
    let service = service_with_event();
    service.add_term(1, "2015-01-02").unwrap();
    service.add_term(1, "2015-01-01T09:00Z").unwrap();
    let view = service.add_term(1, "2015-01-01").unwrap();

    let ordered: Vec<&str> = view.sorted_terms().into_iter().map(|(_, term)| term).collect();
    assert_eq!(ordered, vec!["2015-01-01", "2015-01-01T09:00Z", "2015-01-02"]);
}
