//! Error types for mainote.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using mainote's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mainote operations.
///
/// One variant per failure kind; the HTTP layer decides the response shape by
/// matching on the variant.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller input violates a business rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Referenced note does not exist.
    #[error("Note not found: {0}")]
    NotFound(Uuid),

    /// Metadata could not be serialized for storage.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Stored data could not be decoded (metadata JSON, enumeration values).
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Any other database failure, tagged with the operation that failed.
    #[error("Store error: failed to {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: StoreFailure,
    },
}

impl Error {
    /// Wrap a driver error with the name of the failed operation.
    pub fn store(operation: &'static str, err: sqlx::Error) -> Self {
        Error::Store {
            operation,
            source: StoreFailure::Database(err),
        }
    }

    /// Report a database round trip that exceeded its time budget.
    pub fn store_timeout(operation: &'static str, after: Duration) -> Self {
        Error::Store {
            operation,
            source: StoreFailure::Timeout(after),
        }
    }

    /// Shorthand for a single-field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation(ValidationError::new(field, message))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Underlying cause of a [`Error::Store`] failure.
#[derive(Error, Debug)]
pub enum StoreFailure {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// A single field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Structured validation failure carrying one or more field messages.
///
/// Field order is the order in which the checks produced them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    /// Append another field message.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected failure.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.fields.iter().map(|f| f.message.as_str()).collect();
        write!(f, "Validation errors: {}", messages.join(", "))
    }
}

impl std::error::Error for ValidationError {}
