//! PostgreSQL note repository integration tests.
//!
//! These need a running database:
//!
//! ```sh
//! DATABASE_URL=postgres://... cargo test -p mainote-db --features migrations -- --ignored
//! ```

use std::time::Duration;

use mainote_db::test_fixtures::TestDatabase;
use mainote_db::{
    Error, ListNotesQuery, Note, NoteCategory, NoteRepository, NoteStatus, PgNoteRepository,
};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_create_assigns_id_and_equal_timestamps() {
    let test_db = TestDatabase::new().await;
    let note = test_db.note("buy milk").await;

    assert!(note.has_id());
    assert_eq!(note.created_at, note.updated_at);

    let stored = test_db.db.notes.get_by_id(note.id).await.unwrap();
    assert_eq!(stored.content, "buy milk");
    assert_eq!(stored.status, NoteStatus::Active);
    assert_eq!(stored.created_at, note.created_at);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_create_keeps_preset_id() {
    let test_db = TestDatabase::new().await;
    let id = Uuid::now_v7();
    let mut note = Note::new(test_db.owner_key.clone(), "preset", NoteCategory::Idea);
    note.id = id;
    test_db.db.notes.create(&mut note).await.unwrap();
    assert_eq!(note.id, id);
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_source_column_follows_metadata() {
    let test_db = TestDatabase::new().await;

    let plain = test_db.note("no metadata").await;
    let mut voiced = Note::new(test_db.owner_key.clone(), "spoken", NoteCategory::Personal);
    voiced
        .metadata_mut()
        .insert("source".into(), json!("voice_message"));
    test_db.db.notes.create(&mut voiced).await.unwrap();

    for (id, expected) in [(plain.id, "telegram_bot"), (voiced.id, "voice_message")] {
        let source: String = sqlx::query_scalar("SELECT source FROM notes WHERE id = $1")
            .bind(id)
            .fetch_one(&test_db.pool)
            .await
            .unwrap();
        assert_eq!(source, expected);
    }

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_metadata_absence_and_empty_map_survive() {
    let test_db = TestDatabase::new().await;

    let absent = test_db.note("absent").await;
    let mut empty = Note::new(test_db.owner_key.clone(), "empty", NoteCategory::Task);
    empty.metadata = Some(Default::default());
    test_db.db.notes.create(&mut empty).await.unwrap();

    let absent = test_db.db.notes.get_by_id(absent.id).await.unwrap();
    let empty = test_db.db.notes.get_by_id(empty.id).await.unwrap();
    assert_eq!(absent.metadata, None);
    assert_eq!(empty.metadata, Some(Default::default()));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_list_by_owner_reports_full_total_newest_first() {
    let test_db = TestDatabase::new().await;
    for i in 0..5 {
        test_db.note(&format!("note {}", i)).await;
    }

    let page = test_db
        .db
        .notes
        .list_by_owner(&test_db.owner_key, 2, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.notes.len(), 2);
    assert!(page.notes[0].created_at >= page.notes[1].created_at);

    let tail = test_db
        .db
        .notes
        .list_by_owner(&test_db.owner_key, 10, 4)
        .await
        .unwrap();
    assert_eq!(tail.total, 5);
    assert_eq!(tail.notes.len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_list_unknown_owner_is_empty() {
    let test_db = TestDatabase::new().await;
    let page = test_db
        .db
        .notes
        .list_by_owner(&format!("nobody-{}", Uuid::new_v4()), 10, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.notes.is_empty());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_list_filters_by_category_and_status() {
    let test_db = TestDatabase::new().await;
    let mut done = test_db.note("done task").await;
    done.status = NoteStatus::Done;
    test_db.db.notes.update(&mut done).await.unwrap();
    test_db.note("open task").await;

    let mut query = ListNotesQuery::new(test_db.owner_key.clone(), 10, 0);
    query.category = Some(NoteCategory::Task);
    query.status = Some(NoteStatus::Done);
    let page = test_db.db.notes.list(&query).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.notes[0].id, done.id);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_update_persists_fields_and_restamps() {
    let test_db = TestDatabase::new().await;
    let mut note = test_db.note("draft").await;
    let created_at = note.created_at;

    note.content = "final".into();
    note.title = Some("Title".into());
    note.category = NoteCategory::Idea;
    note.metadata_mut().insert("k".into(), json!(1));
    test_db.db.notes.update(&mut note).await.unwrap();
    assert!(note.updated_at >= created_at);

    let stored = test_db.db.notes.get_by_id(note.id).await.unwrap();
    assert_eq!(stored.content, "final");
    assert_eq!(stored.title.as_deref(), Some("Title"));
    assert_eq!(stored.category, NoteCategory::Idea);
    assert_eq!(stored.created_at, created_at);
    assert_eq!(stored.updated_at, note.updated_at);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_missing_note_is_not_found() {
    let test_db = TestDatabase::new().await;
    let id = Uuid::new_v4();

    assert!(matches!(
        test_db.db.notes.get_by_id(id).await,
        Err(Error::NotFound(missing)) if missing == id
    ));
    assert!(test_db.db.notes.delete(id).await.unwrap_err().is_not_found());

    let mut ghost = Note::new(test_db.owner_key.clone(), "ghost", NoteCategory::Idea);
    ghost.id = id;
    assert!(test_db.db.notes.update(&mut ghost).await.unwrap_err().is_not_found());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_removes_row() {
    let test_db = TestDatabase::new().await;
    let note = test_db.note("temporary").await;

    test_db.db.notes.delete(note.id).await.unwrap();
    assert!(test_db.db.notes.get_by_id(note.id).await.unwrap_err().is_not_found());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_slow_query_times_out_as_store_error() {
    let test_db = TestDatabase::new().await;
    let repo = PgNoteRepository::with_query_timeout(test_db.pool.clone(), Duration::from_nanos(1));

    let result = repo.list_by_owner(&test_db.owner_key, 10, 0).await;
    assert!(matches!(result, Err(Error::Store { .. })));
}
