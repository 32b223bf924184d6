mod common;

use common::setup;
use notekeep_core::repo::note_tag_repo::NoteTagRepository;
use notekeep_core::{CoreError, Entity, NewNote, Outcome, RequestScope};

#[test]
fn tag_names_are_unique_per_owner_only() {
    let (mut conn, app) = setup();
    let mut scope = RequestScope::new(&mut conn);
    let alice = app.signup(&mut scope, "alice");
    let bob = app.signup(&mut scope, "bob");

    app.tags.create_tag(&mut scope, &alice, "work").unwrap();
    let err = app.tags.create_tag(&mut scope, &alice, "work").unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
    let err = app.tags.create_tag(&mut scope, &alice, " WORK ").unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));

    let bobs = app.tags.create_tag(&mut scope, &bob, "work").unwrap();
    assert_eq!(bobs.name, "work");
}

#[test]
fn list_returns_only_own_tags_in_id_order() {
    let (mut conn, app) = setup();
    let mut scope = RequestScope::new(&mut conn);
    let alice = app.signup(&mut scope, "alice");
    let bob = app.signup(&mut scope, "bob");

    let home = app.tag(&mut scope, &alice, "home");
    let work = app.tag(&mut scope, &alice, "Work");
    app.tag(&mut scope, &bob, "private");

    let names = app
        .tags
        .list_tags(&mut scope, &alice)
        .unwrap()
        .into_iter()
        .map(|tag| (tag.id, tag.name))
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![(home, "home".to_string()), (work, "Work".to_string())]
    );
}

#[test]
fn tag_names_are_validated() {
    let (mut conn, app) = setup();
    let mut scope = RequestScope::new(&mut conn);
    let alice = app.signup(&mut scope, "alice");

    assert!(matches!(
        app.tags.create_tag(&mut scope, &alice, "   "),
        Err(CoreError::Validation(_))
    ));
    assert!(matches!(
        app.tags.create_tag(&mut scope, &alice, &"x".repeat(51)),
        Err(CoreError::Validation(_))
    ));
}

#[test]
fn rename_reports_ownership_misses_as_outcomes() {
    let (mut conn, app) = setup();
    let mut scope = RequestScope::new(&mut conn);
    let alice = app.signup(&mut scope, "alice");
    let bob = app.signup(&mut scope, "bob");
    let work = app.tag(&mut scope, &alice, "work");
    app.tag(&mut scope, &alice, "home");

    let renamed = app
        .tags
        .rename_tag(&mut scope, &alice, work, "office")
        .unwrap();
    assert_eq!(renamed.clone().into_option().unwrap().name, "office");

    let foreign = app.tags.rename_tag(&mut scope, &bob, work, "mine").unwrap();
    assert_eq!(foreign, Outcome::Forbidden);
    assert!(foreign.into_option().is_none());

    let missing = app
        .tags
        .rename_tag(&mut scope, &alice, 9_999, "ghost")
        .unwrap();
    assert!(matches!(
        missing.into_result(Entity::Tag, 9_999),
        Err(CoreError::NotFound { entity: Entity::Tag, id: 9_999 })
    ));

    let err = app
        .tags
        .rename_tag(&mut scope, &alice, work, "HOME")
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));

    // Changing only the case of its own name is not a conflict.
    let recased = app
        .tags
        .rename_tag(&mut scope, &alice, work, "Office")
        .unwrap();
    assert!(recased.is_done());
}

#[test]
fn deleting_a_tag_detaches_it_from_every_note() {
    let (mut conn, app) = setup();
    let mut scope = RequestScope::new(&mut conn);
    let alice = app.signup(&mut scope, "alice");
    let work = app.tag(&mut scope, &alice, "work");
    let home = app.tag(&mut scope, &alice, "home");
    let first = app.note(&mut scope, &alice, "first", "c", &[work, home]);
    let second = app.note(&mut scope, &alice, "second", "c", &[work]);

    let deleted = app.tags.delete_tag(&mut scope, &alice, work).unwrap();
    assert_eq!(deleted.into_option().map(|tag| tag.name), Some("work".to_string()));

    let first = app.notes.get_note(&mut scope, &alice, first.id).unwrap().unwrap();
    let second = app.notes.get_note(&mut scope, &alice, second.id).unwrap().unwrap();
    assert_eq!(first.tags.iter().map(|tag| tag.id).collect::<Vec<_>>(), vec![home]);
    assert!(second.tags.is_empty());

    let again = app.tags.delete_tag(&mut scope, &alice, work).unwrap();
    assert_eq!(again, Outcome::NotFound);
}

#[test]
fn delete_of_foreign_tag_is_forbidden_and_keeps_it() {
    let (mut conn, app) = setup();
    let mut scope = RequestScope::new(&mut conn);
    let alice = app.signup(&mut scope, "alice");
    let bob = app.signup(&mut scope, "bob");
    let work = app.tag(&mut scope, &alice, "work");

    assert_eq!(
        app.tags.delete_tag(&mut scope, &bob, work).unwrap(),
        Outcome::Forbidden
    );
    assert_eq!(app.tags.list_tags(&mut scope, &alice).unwrap().len(), 1);
}

#[test]
fn attach_and_detach_require_owning_note_and_tag() {
    let (mut conn, app) = setup();
    let mut scope = RequestScope::new(&mut conn);
    let alice = app.signup(&mut scope, "alice");
    let bob = app.signup(&mut scope, "bob");
    let work = app.tag(&mut scope, &alice, "work");
    let bobs_tag = app.tag(&mut scope, &bob, "bob-only");
    let note = app.note(&mut scope, &alice, "title", "content", &[]);

    let attached = app
        .tags
        .attach_tag(&mut scope, &alice, note.id, work)
        .unwrap()
        .into_result(Entity::Note, note.id)
        .unwrap();
    assert_eq!(attached.tags.len(), 1);
    assert!(attached.updated_at > note.updated_at);

    // Attaching twice keeps a single link.
    let again = app
        .tags
        .attach_tag(&mut scope, &alice, note.id, work)
        .unwrap()
        .into_option()
        .unwrap();
    assert_eq!(again.tags.len(), 1);

    assert_eq!(
        app.tags.attach_tag(&mut scope, &alice, note.id, bobs_tag).unwrap(),
        Outcome::Forbidden
    );
    assert_eq!(
        app.tags.attach_tag(&mut scope, &bob, note.id, bobs_tag).unwrap(),
        Outcome::Forbidden
    );
    assert_eq!(
        app.tags.attach_tag(&mut scope, &alice, 9_999, work).unwrap(),
        Outcome::NotFound
    );

    let detached = app
        .tags
        .detach_tag(&mut scope, &alice, note.id, work)
        .unwrap()
        .into_option()
        .unwrap();
    assert!(detached.tags.is_empty());
    assert_eq!(
        app.tags.detach_tag(&mut scope, &bob, note.id, work).unwrap(),
        Outcome::Forbidden
    );
}

#[test]
fn note_tags_only_reference_owned_tags() {
    let (mut conn, app) = setup();
    let mut scope = RequestScope::new(&mut conn);
    let alice = app.signup(&mut scope, "alice");
    let bob = app.signup(&mut scope, "bob");
    let bobs_tag = app.tag(&mut scope, &bob, "shared-name");

    let err = app
        .notes
        .create_note(
            &mut scope,
            &alice,
            NewNote::new("t", "c").with_tags(vec![bobs_tag]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidReference { entity: Entity::Tag, id } if id == bobs_tag
    ));
}

#[test]
fn join_table_lists_notes_of_a_tag_until_the_tag_is_deleted() {
    let (mut conn, app) = setup();
    let mut scope = RequestScope::new(&mut conn);
    let alice = app.signup(&mut scope, "alice");
    let work = app.tag(&mut scope, &alice, "work");
    let first = app.note(&mut scope, &alice, "first", "c", &[]);
    let second = app.note(&mut scope, &alice, "second", "c", &[]);
    app.note(&mut scope, &alice, "untagged", "c", &[]);

    for note_id in [second.id, first.id] {
        let outcome = app.tags.attach_tag(&mut scope, &alice, note_id, work).unwrap();
        assert!(outcome.is_done());
    }

    let note_ids = scope
        .read("list_for_tag", |tx| NoteTagRepository::new(tx).list_for_tag(work))
        .unwrap();
    assert_eq!(note_ids, vec![first.id, second.id]);

    assert!(app.tags.delete_tag(&mut scope, &alice, work).unwrap().is_done());
    let note_ids = scope
        .read("list_for_tag", |tx| NoteTagRepository::new(tx).list_for_tag(work))
        .unwrap();
    assert!(note_ids.is_empty());
}
