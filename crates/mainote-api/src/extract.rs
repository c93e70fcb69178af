//! Request extractors that reject with classified failures.
//!
//! JSON bodies are decoded in three steps so each failure lands on the right
//! classifier branch:
//!
//! 1. raw JSON object (failure: parsing)
//! 2. required fields present, in declared order (failure: required)
//! 3. typed decode (failure: parsing)

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use mainote_core::ValidationError;

use crate::error_handler::{ApiError, ApiFailure};

/// Body types that name the fields a request cannot omit.
pub trait RequiredFields {
    /// Checked in order; the first absent, null or empty-string field is
    /// reported.
    const REQUIRED: &'static [&'static str];
}

/// First required field that is absent, null, or an empty string.
pub fn missing_required<'a>(body: &serde_json::Map<String, Value>, required: &[&'a str]) -> Option<&'a str> {
    required.iter().copied().find(|field| match body.get(*field) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    })
}

/// JSON body extractor.
#[derive(Debug, Clone)]
pub struct JsonPayload<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + RequiredFields,
{
    type Rejection = ApiFailure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Parsing(e.body_text()))?;

        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Parsing(e.to_string()))?;
        let Value::Object(body) = &value else {
            return Err(ApiError::Parsing("expected a JSON object".to_string()).into());
        };

        if let Some(field) = missing_required(body, T::REQUIRED) {
            return Err(ApiError::Required(field.to_string()).into());
        }

        let payload = serde_json::from_value(value).map_err(|e| ApiError::Parsing(e.to_string()))?;
        Ok(JsonPayload(payload))
    }
}

/// Query string extractor; malformed strings are parsing failures.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiFailure;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Parsing(e.body_text()))?;
        Ok(QueryParams(params))
    }
}

/// Note id from the `:id` path segment.
#[derive(Debug, Clone, Copy)]
pub struct NoteId(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for NoteId
where
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Parsing(e.body_text()))?;
        Uuid::parse_str(&raw)
            .map(NoteId)
            .map_err(|_| ValidationError::new("id", "must be a valid UUID").into())
    }
}
