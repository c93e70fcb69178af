//! Core data models for mainote.
//!
//! These types are shared across all mainote crates and represent the note
//! domain independent of the HTTP wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metadata::Metadata;

// =============================================================================
// ENUMERATIONS
// =============================================================================

/// Kind of note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteCategory {
    Idea,
    Task,
    Personal,
}

impl NoteCategory {
    pub const ALL: [NoteCategory; 3] = [NoteCategory::Idea, NoteCategory::Task, NoteCategory::Personal];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteCategory::Idea => "idea",
            NoteCategory::Task => "task",
            NoteCategory::Personal => "personal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idea" => Some(NoteCategory::Idea),
            "task" => Some(NoteCategory::Task),
            "personal" => Some(NoteCategory::Personal),
            _ => None,
        }
    }
}

impl std::fmt::Display for NoteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    /// Open note (default for new notes)
    #[default]
    Active,
    /// Completed/finished note
    Done,
    /// Archived/inactive note
    Archived,
}

impl NoteStatus {
    pub const ALL: [NoteStatus; 3] = [NoteStatus::Active, NoteStatus::Done, NoteStatus::Archived];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStatus::Active => "active",
            NoteStatus::Done => "done",
            NoteStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(NoteStatus::Active),
            "done" => Some(NoteStatus::Done),
            "archived" => Some(NoteStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// NOTE
// =============================================================================

/// A persisted note.
///
/// `id`, `created_at` and `updated_at` are owned by the Store: whatever the
/// caller puts there is overwritten on create/update. A nil `id` means the
/// Store should assign one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub owner_key: String,
    pub content: String,
    pub title: Option<String>,
    pub category: NoteCategory,
    pub status: NoteStatus,
    pub metadata: Option<Metadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build an unsaved note. Timestamps are placeholders until the Store
    /// stamps them.
    pub fn new(owner_key: impl Into<String>, content: impl Into<String>, category: NoteCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            owner_key: owner_key.into(),
            content: content.into(),
            title: None,
            category,
            status: NoteStatus::Active,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the Store has assigned (or the caller has preset) an id.
    pub fn has_id(&self) -> bool {
        !self.id.is_nil()
    }

    /// Metadata map, created on first access.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        self.metadata.get_or_insert_with(Metadata::new)
    }

    /// `metadata["source"]` when it is a string.
    pub fn source(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(crate::defaults::SOURCE_KEY))
            .and_then(|v| v.as_str())
    }
}

// =============================================================================
// SERVICE REQUESTS
// =============================================================================

/// Input for creating a note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub owner_key: String,
    pub content: String,
    pub title: Option<String>,
    pub category: NoteCategory,
    /// Origin of the note; `None` or empty falls back to the default source.
    pub source: Option<String>,
    pub metadata: Option<Metadata>,
}

/// Sparse patch for an existing note: `None` or a blank string leaves a
/// field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteRequest {
    pub content: Option<String>,
    pub title: Option<String>,
    pub category: Option<NoteCategory>,
    pub status: Option<NoteStatus>,
    /// Merged key-by-key into the existing metadata.
    pub metadata: Option<Metadata>,
}

// =============================================================================
// LISTING
// =============================================================================

/// Filtered, paginated list query over one owner's notes.
///
/// `limit`/`offset` are forwarded to SQL as given; bounds are enforced by the
/// service layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ListNotesQuery {
    pub owner_key: String,
    pub category: Option<NoteCategory>,
    pub status: Option<NoteStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl ListNotesQuery {
    pub fn new(owner_key: impl Into<String>, limit: i64, offset: i64) -> Self {
        Self {
            owner_key: owner_key.into(),
            category: None,
            status: None,
            limit,
            offset,
        }
    }
}

/// One page of notes plus the full matching count.
#[derive(Debug, Clone, PartialEq)]
pub struct NotePage {
    pub notes: Vec<Note>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in NoteCategory::ALL {
            assert_eq!(NoteCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(NoteCategory::parse("shopping"), None);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in NoteStatus::ALL {
            assert_eq!(NoteStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(NoteStatus::parse("ACTIVE"), None);
    }

    #[test]
    fn test_status_default_is_active() {
        assert_eq!(NoteStatus::default(), NoteStatus::Active);
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_value(NoteCategory::Personal).unwrap(), json!("personal"));
        assert_eq!(serde_json::to_value(NoteStatus::Archived).unwrap(), json!("archived"));
    }

    #[test]
    fn test_new_note_is_unsaved_and_active() {
        let note = Note::new("123", "buy milk", NoteCategory::Task);
        assert!(!note.has_id());
        assert_eq!(note.status, NoteStatus::Active);
        assert!(note.metadata.is_none());
    }

    #[test]
    fn test_source_only_reads_strings() {
        let mut note = Note::new("123", "x", NoteCategory::Idea);
        assert_eq!(note.source(), None);
        note.metadata_mut().insert("source".into(), json!(7));
        assert_eq!(note.source(), None);
        note.metadata_mut().insert("source".into(), json!("voice_message"));
        assert_eq!(note.source(), Some("voice_message"));
    }
}
