//! Wire types and adapters between the JSON API and the note domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mainote_core::{
    CreateNoteRequest, Metadata, Note, NoteCategory, NoteStatus, UpdateNoteRequest,
    ValidationError,
};

use crate::extract::RequiredFields;
use crate::services::{ListNotesRequest, NoteListing};

// =============================================================================
// ENUM PARSING
// =============================================================================

fn one_of(values: &[&str]) -> String {
    format!("should be one of: {}", values.join(", "))
}

/// Empty enum strings count as absent.
fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().filter(|v| !v.is_empty())
}

fn parse_category(raw: &str, errors: &mut ValidationError) -> Option<NoteCategory> {
    let parsed = NoteCategory::parse(raw);
    if parsed.is_none() {
        let names: Vec<&str> = NoteCategory::ALL.iter().map(|c| c.as_str()).collect();
        errors.push("category", one_of(&names));
    }
    parsed
}

fn parse_status(raw: &str, errors: &mut ValidationError) -> Option<NoteStatus> {
    let parsed = NoteStatus::parse(raw);
    if parsed.is_none() {
        let names: Vec<&str> = NoteStatus::ALL.iter().map(|s| s.as_str()).collect();
        errors.push("status", one_of(&names));
    }
    parsed
}

// =============================================================================
// REQUESTS
// =============================================================================

/// `POST /api/v1/notes` body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNoteBody {
    pub chat_id: String,
    pub content: String,
    pub title: Option<String>,
    pub category: String,
    pub source: Option<String>,
    pub metadata: Option<Metadata>,
}

impl RequiredFields for CreateNoteBody {
    const REQUIRED: &'static [&'static str] = &["chat_id", "content", "category"];
}

impl CreateNoteBody {
    pub fn into_request(self) -> Result<CreateNoteRequest, ValidationError> {
        let mut errors = ValidationError::default();
        let category = parse_category(&self.category, &mut errors);
        match category {
            Some(category) if errors.is_empty() => Ok(CreateNoteRequest {
                owner_key: self.chat_id,
                content: self.content,
                title: self.title,
                category,
                source: self.source,
                metadata: self.metadata,
            }),
            _ => Err(errors),
        }
    }
}

/// `PUT /api/v1/notes/:id` body. Every field is optional; empty strings
/// leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNoteBody {
    pub content: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub metadata: Option<Metadata>,
}

impl RequiredFields for UpdateNoteBody {
    const REQUIRED: &'static [&'static str] = &[];
}

impl UpdateNoteBody {
    pub fn into_request(self) -> Result<UpdateNoteRequest, ValidationError> {
        let mut errors = ValidationError::default();
        let category = present(&self.category).and_then(|c| parse_category(c, &mut errors));
        let status = present(&self.status).and_then(|s| parse_status(s, &mut errors));
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(UpdateNoteRequest {
            content: self.content,
            title: self.title,
            category,
            status,
            metadata: self.metadata,
        })
    }
}

/// `GET /api/v1/notes` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNotesParams {
    pub chat_id: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Outcome of adapting list parameters.
#[derive(Debug)]
pub enum ListParamsError {
    MissingChatId,
    Invalid(ValidationError),
}

impl ListNotesParams {
    pub fn into_request(self) -> Result<ListNotesRequest, ListParamsError> {
        let owner_key = match self.chat_id {
            Some(chat_id) if !chat_id.is_empty() => chat_id,
            _ => return Err(ListParamsError::MissingChatId),
        };

        let mut errors = ValidationError::default();
        let category = present(&self.category).and_then(|c| parse_category(c, &mut errors));
        let status = present(&self.status).and_then(|s| parse_status(s, &mut errors));
        if !errors.is_empty() {
            return Err(ListParamsError::Invalid(errors));
        }

        Ok(ListNotesRequest {
            owner_key,
            category,
            status,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Note as returned by every note endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteResponse {
    pub id: Uuid,
    pub chat_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub category: NoteCategory,
    pub status: NoteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            chat_id: note.owner_key,
            content: note.content,
            title: note.title,
            category: note.category,
            status: note.status,
            metadata: note.metadata,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListNotesResponse {
    pub items: Vec<NoteResponse>,
    pub pagination: Pagination,
}

impl From<NoteListing> for ListNotesResponse {
    fn from(listing: NoteListing) -> Self {
        Self {
            items: listing.notes.into_iter().map(NoteResponse::from).collect(),
            pagination: Pagination {
                total: listing.total,
                limit: listing.limit,
                offset: listing.offset,
            },
        }
    }
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub service: String,
}
