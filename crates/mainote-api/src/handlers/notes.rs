//! Note HTTP handlers.
//!
//! Handlers only adapt: wire body in, service call, wire body out. Every
//! failure is returned as an [`ApiFailure`] so the classifier writes the body.

use axum::{extract::State, http::StatusCode, Json};

use crate::error_handler::{ApiError, ApiFailure};
use crate::extract::{JsonPayload, NoteId, QueryParams};
use crate::wire::{
    CreateNoteBody, ListNotesParams, ListNotesResponse, ListParamsError, NoteResponse,
    UpdateNoteBody,
};
use crate::AppState;

/// Create a note.
///
/// # Returns
/// - 201 Created with the stored note
/// - 400 / 422 for malformed or invalid bodies
pub async fn create_note(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload<CreateNoteBody>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiFailure> {
    let request = body.into_request()?;
    let note = state.notes.create_note(request).await?;
    Ok((StatusCode::CREATED, Json(note.into())))
}

/// Fetch a note by id.
pub async fn get_note(
    State(state): State<AppState>,
    NoteId(id): NoteId,
) -> Result<Json<NoteResponse>, ApiFailure> {
    let note = state.notes.get_note(id).await?;
    Ok(Json(note.into()))
}

/// Apply a sparse update to a note.
pub async fn update_note(
    State(state): State<AppState>,
    NoteId(id): NoteId,
    JsonPayload(body): JsonPayload<UpdateNoteBody>,
) -> Result<Json<NoteResponse>, ApiFailure> {
    let request = body.into_request()?;
    let note = state.notes.update_note(id, request).await?;
    Ok(Json(note.into()))
}

/// Delete a note.
///
/// # Returns
/// - 204 No Content on success
/// - 404 when the note does not exist
pub async fn delete_note(
    State(state): State<AppState>,
    NoteId(id): NoteId,
) -> Result<StatusCode, ApiFailure> {
    state.notes.delete_note(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List one chat's notes, newest first.
///
/// # Query Parameters
/// - `chat_id`: owner (required)
/// - `category`, `status`: optional filters
/// - `limit` (default 20, max 100), `offset` (default 0)
pub async fn list_notes(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListNotesParams>,
) -> Result<Json<ListNotesResponse>, ApiFailure> {
    let request = params.into_request().map_err(|e| match e {
        ListParamsError::MissingChatId => ApiFailure::new(ApiError::Required("chat_id".into())),
        ListParamsError::Invalid(v) => ApiFailure::new(v),
    })?;
    let listing = state.notes.list_notes(request).await?;
    Ok(Json(listing.into()))
}
