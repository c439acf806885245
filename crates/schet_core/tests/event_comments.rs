use schet_core::{CommentPatch, EventError, EventService, MemoryDocumentStore};

fn service_with_event() -> EventService<MemoryDocumentStore> {
    let service = EventService::new(MemoryDocumentStore::new());
    service.create("lunch", "").unwrap();
    service
}

#[test]
fn add_comment_works_on_open_and_fixed_events() {
    let service = service_with_event();
    service.add_comment(1, "alice", "first").unwrap();
    service.add_term(1, "2014-01-01").unwrap();
    service.fix(1, 1).unwrap();

    let view = service.add_comment(1, "bob", "line one\nline two").unwrap();

    assert_eq!(view.comments.len(), 2);
    assert_eq!(view.comments[&2].name, "bob");
    assert_eq!(view.comments[&2].body, "line one\nline two");
}

#[test]
fn add_comment_on_missing_event_reports_not_found() {
    let service = service_with_event();
    service.delete(1).unwrap();
    assert!(matches!(
        service.add_comment(1, "alice", "hi"),
        Err(EventError::NotFound { deleted: true })
    ));
}

#[test]
fn update_comment_edits_supplied_fields_only() {
    let service = service_with_event();
    service.add_comment(1, "alice", "draft").unwrap();

    let view = service
        .update_comment(
            1,
            1,
            CommentPatch {
                body: Some("final".to_string()),
                ..CommentPatch::default()
            },
        )
        .unwrap();

    assert_eq!(view.comments[&1].name, "alice");
    assert_eq!(view.comments[&1].body, "final");
}

#[test]
fn update_comment_is_allowed_on_fixed_events() {
    let service = service_with_event();
    service.add_comment(1, "alice", "draft").unwrap();
    service.add_term(1, "2014-01-01").unwrap();
    service.fix(1, 1).unwrap();

    let view = service
        .update_comment(
            1,
            1,
            CommentPatch {
                name: Some("al".to_string()),
                ..CommentPatch::default()
            },
        )
        .unwrap();
    assert_eq!(view.comments[&1].name, "al");
}

#[test]
fn update_comment_reports_missing_comments() {
    let service = service_with_event();
    service.add_comment(1, "alice", "x").unwrap();
    service.delete_comment(1, 1).unwrap();

    let patch = CommentPatch {
        body: Some("y".to_string()),
        ..CommentPatch::default()
    };
    assert!(matches!(
        service.update_comment(1, 1, patch.clone()),
        Err(EventError::CommentNotFound { deleted: true })
    ));
    assert!(matches!(
        service.update_comment(1, 5, patch),
        Err(EventError::CommentNotFound { deleted: false })
    ));

    let passthrough = service
        .update_comment(1, 5, CommentPatch::default())
        .unwrap();
    assert!(passthrough.comments.is_empty());
}

#[test]
fn delete_comment_is_idempotent_and_ids_are_not_reused() {
    let service = service_with_event();
    service.add_comment(1, "alice", "a").unwrap();
    service.add_comment(1, "bob", "b").unwrap();

    let first = service.delete_comment(1, 2).unwrap();
    let second = service.delete_comment(1, 2).unwrap();
    assert_eq!(first, second);

    assert!(matches!(
        service.delete_comment(1, 3),
        Err(EventError::CommentNotFound { deleted: false })
    ));

    let view = service.add_comment(1, "carol", "c").unwrap();
    assert_eq!(view.comments.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
}
