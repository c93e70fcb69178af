//! Note business rules.
//!
//! Validation, defaults and metadata provenance live here; persistence is
//! delegated to a [`NoteRepository`].
//!
//! ## Metadata on create
//!
//! 1. `source` seeded from the request (or `telegram_bot`)
//! 2. caller metadata merged over it
//! 3. `created_via` / `api_version` stamped last, always overwriting
//!
//! ## Metadata on update
//!
//! Caller keys overwrite, unmentioned keys survive, then `updated_via` /
//! `api_version` are stamped.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use mainote_core::{
    defaults, logging, metadata, CreateNoteRequest, ListNotesQuery, Metadata, Note, NoteCategory,
    NoteRepository, NoteStatus, Result, UpdateNoteRequest, ValidationError,
};

/// List request as received from the transport; pagination is optional.
#[derive(Debug, Clone, Default)]
pub struct ListNotesRequest {
    pub owner_key: String,
    pub category: Option<NoteCategory>,
    pub status: Option<NoteStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One page of notes with the effective pagination.
#[derive(Debug, Clone)]
pub struct NoteListing {
    pub notes: Vec<Note>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Note lifecycle operations.
#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self { repo }
    }

    /// Create a note.
    ///
    /// Status is always `active`. Content and owner are checked before the
    /// repository is touched.
    pub async fn create_note(&self, request: CreateNoteRequest) -> Result<Note> {
        let mut errors = ValidationError::default();
        if request.content.trim().is_empty() {
            errors.push("content", "note content cannot be empty");
        }
        if request.owner_key.trim().is_empty() {
            errors.push("chat_id", "chat ID cannot be empty");
        }
        errors.into_result()?;

        let source = request
            .source
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| defaults::DEFAULT_SOURCE.to_string());

        let mut note = Note::new(request.owner_key, request.content, request.category);
        note.title = request.title;
        note.status = NoteStatus::Active;

        let meta = note.metadata_mut();
        meta.insert(defaults::SOURCE_KEY.to_string(), Value::String(source));
        if let Some(extra) = request.metadata {
            metadata::merge(meta, extra);
        }
        stamp(meta, defaults::CREATED_VIA_KEY);

        self.repo.create(&mut note).await?;

        info!(
            subsystem = logging::SUBSYSTEM_SERVICE,
            component = "notes",
            op = "create",
            note_id = %note.id,
            owner_key = %note.owner_key,
            "Note created"
        );
        Ok(note)
    }

    pub async fn get_note(&self, id: Uuid) -> Result<Note> {
        self.repo.get_by_id(id).await
    }

    /// Apply a sparse patch to an existing note.
    ///
    /// Absent fields and blank strings leave the stored value untouched.
    pub async fn update_note(&self, id: Uuid, request: UpdateNoteRequest) -> Result<Note> {
        let mut note = self.repo.get_by_id(id).await?;

        if let Some(content) = non_blank(request.content) {
            note.content = content;
        }
        if let Some(title) = non_blank(request.title) {
            note.title = Some(title);
        }
        if let Some(category) = request.category {
            note.category = category;
        }
        if let Some(status) = request.status {
            note.status = status;
        }

        let meta = note.metadata_mut();
        if let Some(patch) = request.metadata {
            metadata::merge(meta, patch);
        }
        stamp(meta, defaults::UPDATED_VIA_KEY);

        self.repo.update(&mut note).await?;

        debug!(
            subsystem = logging::SUBSYSTEM_SERVICE,
            component = "notes",
            op = "update",
            note_id = %note.id,
            "Note updated"
        );
        Ok(note)
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await?;
        info!(
            subsystem = logging::SUBSYSTEM_SERVICE,
            component = "notes",
            op = "delete",
            note_id = %id,
            "Note deleted"
        );
        Ok(())
    }

    /// List one owner's notes, newest first.
    ///
    /// Omitted pagination falls back to limit 20 / offset 0. A limit below 1
    /// or a negative offset is rejected; a limit above 100 is capped.
    pub async fn list_notes(&self, request: ListNotesRequest) -> Result<NoteListing> {
        let limit = request.limit.unwrap_or(defaults::PAGE_LIMIT);
        let offset = request.offset.unwrap_or(defaults::PAGE_OFFSET);

        let mut errors = ValidationError::default();
        if request.owner_key.trim().is_empty() {
            errors.push("chat_id", "chat ID cannot be empty");
        }
        if limit < 1 {
            errors.push("limit", "must be >= 1");
        }
        if offset < 0 {
            errors.push("offset", "must be >= 0");
        }
        errors.into_result()?;

        let limit = limit.min(defaults::PAGE_LIMIT_MAX);
        let mut query = ListNotesQuery::new(request.owner_key, limit, offset);
        query.category = request.category;
        query.status = request.status;

        let page = self.repo.list(&query).await?;

        debug!(
            subsystem = logging::SUBSYSTEM_SERVICE,
            component = "notes",
            op = "list",
            owner_key = %query.owner_key,
            result_count = page.notes.len(),
            total = page.total,
            limit,
            offset,
            "Notes listed"
        );
        Ok(NoteListing {
            notes: page.notes,
            total: page.total,
            limit,
            offset,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Write the provenance pair `<via_key> = "api"`, `api_version = "v1"`.
fn stamp(meta: &mut Metadata, via_key: &str) {
    meta.insert(via_key.to_string(), Value::String(defaults::VIA_API.to_string()));
    meta.insert(
        defaults::API_VERSION_KEY.to_string(),
        Value::String(defaults::API_VERSION.to_string()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use mainote_core::Error;
    use mainote_db::mock::InMemoryNoteRepository;
    use serde_json::json;

    fn service() -> (NoteService, InMemoryNoteRepository) {
        let repo = InMemoryNoteRepository::new();
        (NoteService::new(Arc::new(repo.clone())), repo)
    }

    fn create_request(content: &str) -> CreateNoteRequest {
        CreateNoteRequest {
            owner_key: "123".into(),
            content: content.into(),
            title: None,
            category: NoteCategory::Task,
            source: None,
            metadata: None,
        }
    }

    fn object(value: Value) -> Metadata {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_buy_milk_defaults() {
        let (svc, _) = service();
        let note = svc.create_note(create_request("buy milk")).await.unwrap();

        assert_eq!(note.status, NoteStatus::Active);
        assert!(note.has_id());
        assert_eq!(note.created_at, note.updated_at);
        let meta = note.metadata.unwrap();
        assert_eq!(meta["source"], json!("telegram_bot"));
        assert_eq!(meta["created_via"], json!("api"));
        assert_eq!(meta["api_version"], json!("v1"));
    }

    #[tokio::test]
    async fn test_create_empty_content_never_reaches_store() {
        let (svc, repo) = service();
        let err = svc.create_note(create_request("")).await.unwrap_err();

        match err {
            Error::Validation(v) => assert_eq!(v.fields()[0].field, "content"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_whitespace_content_rejected() {
        let (svc, _) = service();
        let result = svc.create_note(create_request("   \n")).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_reports_every_invalid_field() {
        let (svc, repo) = service();
        let mut request = create_request("");
        request.owner_key = String::new();
        let err = svc.create_note(request).await.unwrap_err();

        let Error::Validation(v) = err else {
            panic!("Expected Validation error");
        };
        let fields: Vec<_> = v.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["content", "chat_id"]);
        assert_eq!(v.fields()[1].message, "chat ID cannot be empty");
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn test_create_explicit_source_and_caller_metadata() {
        let (svc, repo) = service();
        let mut request = create_request("hello");
        request.source = Some("voice_message".into());
        request.metadata = Some(object(json!({"message_id": 42})));
        let note = svc.create_note(request).await.unwrap();

        let meta = note.metadata.unwrap();
        assert_eq!(meta["source"], json!("voice_message"));
        assert_eq!(meta["message_id"], json!(42));
        assert_eq!(repo.stored_source(note.id).as_deref(), Some("voice_message"));
    }

    #[tokio::test]
    async fn test_create_empty_source_falls_back_to_default() {
        let (svc, _) = service();
        let mut request = create_request("hello");
        request.source = Some(String::new());
        let note = svc.create_note(request).await.unwrap();
        assert_eq!(note.metadata.unwrap()["source"], json!("telegram_bot"));
    }

    #[tokio::test]
    async fn test_create_caller_metadata_wins_over_source_but_not_provenance() {
        let (svc, _) = service();
        let mut request = create_request("hello");
        request.source = Some("bot".into());
        request.metadata = Some(object(json!({
            "source": "import",
            "created_via": "cli",
            "api_version": "v0"
        })));
        let note = svc.create_note(request).await.unwrap();

        let meta = note.metadata.unwrap();
        assert_eq!(meta["source"], json!("import"));
        assert_eq!(meta["created_via"], json!("api"));
        assert_eq!(meta["api_version"], json!("v1"));
    }

    #[tokio::test]
    async fn test_create_store_failure_propagates() {
        let (svc, repo) = service();
        repo.fail_next("connection refused");
        let result = svc.create_note(create_request("hello")).await;
        assert!(matches!(result, Err(Error::Store { .. })));
    }

    #[tokio::test]
    async fn test_update_empty_patch_changes_only_provenance() {
        let (svc, _) = service();
        let mut request = create_request("original");
        request.title = Some("Title".into());
        request.metadata = Some(object(json!({"k": "v"})));
        let created = svc.create_note(request).await.unwrap();

        let updated = svc
            .update_note(created.id, UpdateNoteRequest::default())
            .await
            .unwrap();

        assert_eq!(updated.content, created.content);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.status, created.status);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let meta = updated.metadata.unwrap();
        assert_eq!(meta["k"], json!("v"));
        assert_eq!(meta["updated_via"], json!("api"));
        assert_eq!(meta["api_version"], json!("v1"));
        assert_eq!(meta["created_via"], json!("api"));
    }

    #[tokio::test]
    async fn test_update_applies_present_fields() {
        let (svc, repo) = service();
        let created = svc.create_note(create_request("draft")).await.unwrap();

        let updated = svc
            .update_note(
                created.id,
                UpdateNoteRequest {
                    content: Some("final".into()),
                    title: Some("Done".into()),
                    category: Some(NoteCategory::Idea),
                    status: Some(NoteStatus::Done),
                    metadata: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.content, "final");
        assert_eq!(updated.title.as_deref(), Some("Done"));
        assert_eq!(updated.category, NoteCategory::Idea);
        assert_eq!(updated.status, NoteStatus::Done);
        assert_eq!(repo.stored(created.id).unwrap().content, "final");
    }

    #[tokio::test]
    async fn test_update_metadata_merges_key_by_key() {
        let (svc, _) = service();
        let mut request = create_request("x");
        request.metadata = Some(object(json!({"a": 1, "b": 2})));
        let created = svc.create_note(request).await.unwrap();

        let updated = svc
            .update_note(
                created.id,
                UpdateNoteRequest {
                    metadata: Some(object(json!({"b": 20, "c": 30}))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let meta = updated.metadata.unwrap();
        assert_eq!(meta["a"], json!(1));
        assert_eq!(meta["b"], json!(20));
        assert_eq!(meta["c"], json!(30));
    }

    #[tokio::test]
    async fn test_update_blank_strings_leave_fields_untouched() {
        let (svc, repo) = service();
        let mut request = create_request("keep");
        request.title = Some("Old".into());
        let created = svc.create_note(request).await.unwrap();

        for (content, title) in [("", ""), ("   ", " \n")] {
            let updated = svc
                .update_note(
                    created.id,
                    UpdateNoteRequest {
                        content: Some(content.into()),
                        title: Some(title.into()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            assert_eq!(updated.content, "keep");
            assert_eq!(updated.title.as_deref(), Some("Old"));
        }

        let stored = repo.stored(created.id).unwrap();
        assert_eq!(stored.content, "keep");
        assert_eq!(stored.title.as_deref(), Some("Old"));
        assert_eq!(repo.call_count("update"), 2);
    }

    #[tokio::test]
    async fn test_create_blank_chat_id_rejected() {
        let (svc, repo) = service();
        let mut request = create_request("hello");
        request.owner_key = "   ".into();
        let err = svc.create_note(request).await.unwrap_err();

        let Error::Validation(v) = err else {
            panic!("Expected Validation error");
        };
        assert_eq!(v.fields()[0].field, "chat_id");
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_note_is_not_found() {
        let (svc, repo) = service();
        let result = svc
            .update_note(Uuid::new_v4(), UpdateNoteRequest::default())
            .await;
        assert!(result.unwrap_err().is_not_found());
        assert_eq!(repo.call_count("update"), 0);
    }

    #[tokio::test]
    async fn test_get_and_delete_pass_through() {
        let (svc, _) = service();
        let created = svc.create_note(create_request("bye")).await.unwrap();

        assert_eq!(svc.get_note(created.id).await.unwrap().id, created.id);
        svc.delete_note(created.id).await.unwrap();
        assert!(svc.get_note(created.id).await.unwrap_err().is_not_found());
        assert!(svc.delete_note(created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_defaults_pagination() {
        let (svc, repo) = service();
        for i in 0..3 {
            svc.create_note(create_request(&format!("n{}", i))).await.unwrap();
        }

        let listing = svc
            .list_notes(ListNotesRequest {
                owner_key: "123".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(listing.limit, 20);
        assert_eq!(listing.offset, 0);
        assert_eq!(listing.total, 3);
        assert_eq!(listing.notes.len(), 3);
        assert_eq!(repo.call_count("list"), 1);
    }

    #[tokio::test]
    async fn test_list_total_ignores_page_window() {
        let (svc, _) = service();
        for i in 0..5 {
            svc.create_note(create_request(&format!("n{}", i))).await.unwrap();
        }

        let listing = svc
            .list_notes(ListNotesRequest {
                owner_key: "123".into(),
                limit: Some(2),
                offset: Some(4),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listing.total, 5);
        assert_eq!(listing.notes.len(), 1);
    }

    #[tokio::test]
    async fn test_list_caps_large_limit() {
        let (svc, _) = service();
        let listing = svc
            .list_notes(ListNotesRequest {
                owner_key: "123".into(),
                limit: Some(1_000),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listing.limit, 100);
    }

    #[tokio::test]
    async fn test_list_rejects_out_of_range_pagination() {
        let (svc, repo) = service();
        let err = svc
            .list_notes(ListNotesRequest {
                owner_key: "123".into(),
                limit: Some(0),
                offset: Some(-1),
                ..Default::default()
            })
            .await
            .unwrap_err();

        let Error::Validation(v) = err else {
            panic!("Expected Validation error");
        };
        assert_eq!(v.fields()[0].field, "limit");
        assert_eq!(v.fields()[0].message, "must be >= 1");
        assert_eq!(v.fields()[1].field, "offset");
        assert_eq!(v.fields()[1].message, "must be >= 0");
        assert_eq!(repo.call_count("list"), 0);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let (svc, _) = service();
        let created = svc.create_note(create_request("a")).await.unwrap();
        svc.create_note(create_request("b")).await.unwrap();
        svc.update_note(
            created.id,
            UpdateNoteRequest {
                status: Some(NoteStatus::Archived),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let listing = svc
            .list_notes(ListNotesRequest {
                owner_key: "123".into(),
                status: Some(NoteStatus::Archived),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.notes[0].id, created.id);
    }
}
