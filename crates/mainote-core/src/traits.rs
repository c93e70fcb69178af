//! Core traits for mainote abstractions.
//!
//! The service layer only talks to storage through [`NoteRepository`], so a
//! PostgreSQL backend and an in-memory backend are interchangeable.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Repository for note CRUD operations.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Persist a new note.
    ///
    /// Assigns an id when the note has none, stamps both timestamps, and
    /// overwrites the caller's id/timestamps with the stored values. On
    /// failure the caller's note is left untouched.
    async fn create(&self, note: &mut Note) -> Result<()>;

    /// Fetch a note by id. Fails with `Error::NotFound` when no row matches.
    async fn get_by_id(&self, id: Uuid) -> Result<Note>;

    /// List notes matching the query, newest first, with the total count of
    /// matching rows ignoring `limit`/`offset`.
    async fn list(&self, query: &ListNotesQuery) -> Result<NotePage>;

    /// Persist every mutable field of an existing note and restamp
    /// `updated_at`. Fails with `Error::NotFound` when no row matches.
    async fn update(&self, note: &mut Note) -> Result<()>;

    /// Physically delete a note. Fails with `Error::NotFound` when no row
    /// was affected.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// List one owner's notes without category/status filters.
    async fn list_by_owner(&self, owner_key: &str, limit: i64, offset: i64) -> Result<NotePage> {
        self.list(&ListNotesQuery::new(owner_key, limit, offset))
            .await
    }
}
