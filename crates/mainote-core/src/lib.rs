//! # mainote-core
//!
//! Core types, traits, and abstractions for the mainote note service.
//!
//! This crate provides the note data model, the error taxonomy shared by every
//! layer, the metadata codec, and the repository trait that storage backends
//! implement.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, FieldError, Result, StoreFailure, ValidationError};
pub use metadata::Metadata;
pub use models::*;
pub use traits::*;
