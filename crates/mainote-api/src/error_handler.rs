//! Failure classification.
//!
//! Every error body the API writes goes through [`classify`]. The chain is
//! ordered and the first match wins:
//!
//! | Check | Status | Body |
//! |-------|--------|------|
//! | payload could not be parsed | 400 | `{"errorMessage":"Invalid payload, expected valid json."}` |
//! | required field missing | 422 | `"Data is invalid."` + one `required field is missing.` entry |
//! | structured validation failure | 422 | `"Data is invalid."` + every field message |
//! | anything else | 500 or override | `{"errorMessage":"Internal error."}` or override |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use mainote_core::{logging, FieldError, ValidationError};

pub const INVALID_PAYLOAD: &str = "Invalid payload, expected valid json.";
pub const DATA_INVALID: &str = "Data is invalid.";
pub const REQUIRED_FIELD_MISSING: &str = "required field is missing.";
pub const INTERNAL_ERROR: &str = "Internal error.";
pub const NOTE_NOT_FOUND: &str = "Note not found.";

/// Failure shapes the HTTP layer distinguishes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body or query string could not be decoded.
    #[error("payload could not be parsed: {0}")]
    Parsing(String),

    /// A required field was absent, null or empty.
    #[error("required field missing: {0}")]
    Required(String),

    #[error(transparent)]
    Validation(ValidationError),

    /// Any other failure from the service or store.
    #[error(transparent)]
    Internal(mainote_core::Error),

    /// Failure raised by the HTTP stack itself (timeout, panic).
    #[error("{0}")]
    Stack(String),
}

impl ApiError {
    pub fn is_parsing(&self) -> bool {
        matches!(self, ApiError::Parsing(_))
    }

    /// Name of the missing required field.
    pub fn required_field(&self) -> Option<&str> {
        match self {
            ApiError::Required(field) => Some(field.as_str()),
            _ => None,
        }
    }

    /// Field messages of a structured validation failure, in check order.
    pub fn validation_fields(&self) -> Option<&[FieldError]> {
        match self {
            ApiError::Validation(v) => Some(v.fields()),
            _ => None,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<mainote_core::Error> for ApiError {
    fn from(err: mainote_core::Error) -> Self {
        match err {
            mainote_core::Error::Validation(v) => ApiError::Validation(v),
            other => ApiError::Internal(other),
        }
    }
}

/// Caller-supplied replacement for the generic failure response.
///
/// Code and body apply independently; a missing part keeps its default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseOverride {
    pub code: Option<StatusCode>,
    pub body: Option<Value>,
}

impl ResponseOverride {
    pub fn new(code: StatusCode, body: Value) -> Self {
        Self {
            code: Some(code),
            body: Some(body),
        }
    }

    pub fn code(code: StatusCode) -> Self {
        Self {
            code: Some(code),
            body: None,
        }
    }

    pub fn body(body: Value) -> Self {
        Self {
            code: None,
            body: Some(body),
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, json!({ "errorMessage": NOTE_NOT_FOUND }))
    }
}

fn data_invalid<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Value {
    let fields: Vec<Value> = fields
        .into_iter()
        .map(|(field, message)| json!({ "field": field, "error": message }))
        .collect();
    json!({ "errorMessage": DATA_INVALID, "errorFields": fields })
}

/// Pick the status and JSON body for a failure.
///
/// `response` is only consulted on the generic branch.
pub fn classify(err: &ApiError, response: Option<&ResponseOverride>) -> (StatusCode, Value) {
    if err.is_parsing() {
        return (
            StatusCode::BAD_REQUEST,
            json!({ "errorMessage": INVALID_PAYLOAD }),
        );
    }
    if let Some(field) = err.required_field() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            data_invalid([(field, REQUIRED_FIELD_MISSING)]),
        );
    }
    if let Some(fields) = err.validation_fields() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            data_invalid(fields.iter().map(|f| (f.field.as_str(), f.message.as_str()))),
        );
    }

    let code = response
        .and_then(|r| r.code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = response
        .and_then(|r| r.body.clone())
        .unwrap_or_else(|| json!({ "errorMessage": INTERNAL_ERROR }));
    (code, body)
}

/// Handler error: the failure plus an optional response override.
#[derive(Debug)]
pub struct ApiFailure {
    pub error: ApiError,
    pub response: Option<ResponseOverride>,
}

impl ApiFailure {
    pub fn new(error: impl Into<ApiError>) -> Self {
        Self {
            error: error.into(),
            response: None,
        }
    }

    pub fn with_response(mut self, response: ResponseOverride) -> Self {
        self.response = Some(response);
        self
    }
}

impl From<ApiError> for ApiFailure {
    fn from(error: ApiError) -> Self {
        Self::new(error)
    }
}

impl From<ValidationError> for ApiFailure {
    fn from(error: ValidationError) -> Self {
        Self::new(error)
    }
}

/// Missing notes reach the client as 404 through the override path.
impl From<mainote_core::Error> for ApiFailure {
    fn from(err: mainote_core::Error) -> Self {
        let not_found = err.is_not_found();
        let failure = Self::new(err);
        if not_found {
            failure.with_response(ResponseOverride::not_found())
        } else {
            failure
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, body) = classify(&self.error, self.response.as_ref());

        // Logged inside the request span, which carries method, uri and request id.
        if status.is_server_error() {
            error!(
                subsystem = logging::SUBSYSTEM_API,
                component = "error_handler",
                status = status.as_u16(),
                error = %self.error,
                "Error response"
            );
        } else {
            warn!(
                subsystem = logging::SUBSYSTEM_API,
                component = "error_handler",
                status = status.as_u16(),
                error = %self.error,
                "Error response"
            );
        }

        (status, Json(body)).into_response()
    }
}

/// Converts middleware errors (request timeout) into a classified failure.
pub async fn handle_stack_error(err: BoxError) -> ApiFailure {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiFailure::new(ApiError::Stack("request timed out".to_string()))
    } else {
        ApiFailure::new(ApiError::Stack(err.to_string()))
    }
}

/// Response for panics caught by the HTTP stack.
pub fn panic_response(_panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    ApiFailure::new(ApiError::Stack("handler panicked".to_string())).into_response()
}
