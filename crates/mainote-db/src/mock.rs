//! In-memory note repository for tests that must not require PostgreSQL.
//!
//! Mirrors the PostgreSQL repository's observable behavior: id assignment,
//! source stamping, newest-first ordering with id tie-break, and `NotFound`
//! on missing rows. Calls are logged for assertion, a failure can be
//! queued for the next call, and every call can be slowed down.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mainote_db::mock::InMemoryNoteRepository;
//!
//! let repo = InMemoryNoteRepository::new();
//! repo.fail_next("connection reset");
//! assert!(repo.get_by_id(id).await.is_err());
//! assert_eq!(repo.call_count("fetch"), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use mainote_core::{
    defaults, Error, ListNotesQuery, Note, NotePage, NoteRepository, Result,
};

/// A recorded repository call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub operation: &'static str,
    pub note_id: Option<Uuid>,
}

#[derive(Default)]
struct MockState {
    notes: HashMap<Uuid, Note>,
    sources: HashMap<Uuid, String>,
    calls: Vec<MockCall>,
    fail_next: Option<String>,
    latency: Option<Duration>,
}

/// In-memory NoteRepository.
#[derive(Clone, Default)]
pub struct InMemoryNoteRepository {
    state: Arc<Mutex<MockState>>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next repository call fail with a Store error.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock().fail_next = Some(message.into());
    }

    /// Delay every subsequent call by `latency` before it touches state.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    async fn pause(&self) {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Number of logged calls for one operation ("create", "fetch", "list",
    /// "update", "delete").
    pub fn call_count(&self, operation: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Stored copy of a note, bypassing the call log.
    pub fn stored(&self, id: Uuid) -> Option<Note> {
        self.lock().notes.get(&id).cloned()
    }

    /// Value the `source` column would hold for a stored note.
    pub fn stored_source(&self, id: Uuid) -> Option<String> {
        self.lock().sources.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Log the call, then fail if a failure was queued.
    fn begin(
        state: &mut MockState,
        operation: &'static str,
        note_id: Option<Uuid>,
    ) -> Result<()> {
        state.calls.push(MockCall { operation, note_id });
        match state.fail_next.take() {
            Some(message) => Err(Error::store(operation, sqlx::Error::Protocol(message))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    async fn create(&self, note: &mut Note) -> Result<()> {
        self.pause().await;
        let mut state = self.lock();
        Self::begin(&mut state, "create", note.has_id().then_some(note.id))?;

        let id = if note.has_id() { note.id } else { Uuid::now_v7() };
        if state.notes.contains_key(&id) {
            return Err(Error::store(
                "create note",
                sqlx::Error::Protocol(format!("duplicate key value: id {}", id)),
            ));
        }

        let now = Utc::now();
        let source = note.source().unwrap_or(defaults::DEFAULT_SOURCE).to_string();
        note.id = id;
        note.created_at = now;
        note.updated_at = now;
        state.sources.insert(id, source);
        state.notes.insert(id, note.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Note> {
        self.pause().await;
        let mut state = self.lock();
        Self::begin(&mut state, "fetch", Some(id))?;
        state.notes.get(&id).cloned().ok_or(Error::NotFound(id))
    }

    async fn list(&self, query: &ListNotesQuery) -> Result<NotePage> {
        self.pause().await;
        let mut state = self.lock();
        Self::begin(&mut state, "list", None)?;

        let mut matching: Vec<Note> = state
            .notes
            .values()
            .filter(|n| n.owner_key == query.owner_key)
            .filter(|n| query.category.map_or(true, |c| n.category == c))
            .filter(|n| query.status.map_or(true, |s| n.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as i64;
        let notes = matching
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        Ok(NotePage { notes, total })
    }

    async fn update(&self, note: &mut Note) -> Result<()> {
        self.pause().await;
        let mut state = self.lock();
        Self::begin(&mut state, "update", Some(note.id))?;

        let stored = state.notes.get_mut(&note.id).ok_or(Error::NotFound(note.id))?;
        let updated_at = Utc::now().max(stored.created_at);
        stored.content = note.content.clone();
        stored.title = note.title.clone();
        stored.category = note.category;
        stored.status = note.status;
        stored.metadata = note.metadata.clone();
        stored.updated_at = updated_at;
        note.updated_at = updated_at;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.pause().await;
        let mut state = self.lock();
        Self::begin(&mut state, "delete", Some(id))?;
        state.sources.remove(&id);
        state.notes.remove(&id).map(|_| ()).ok_or(Error::NotFound(id))
    }
}
