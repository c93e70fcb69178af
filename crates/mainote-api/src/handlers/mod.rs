//! HTTP handlers for mainote-api.

pub mod health;
pub mod notes;
