//! Centralized default constants for mainote.
//!
//! Every crate references these instead of repeating literals. The provenance
//! values are part of the public data contract: clients read them back out of
//! note metadata.

// =============================================================================
// NOTE METADATA
// =============================================================================

/// Metadata key holding the note's origin (bot, voice message, ...).
pub const SOURCE_KEY: &str = "source";

/// Source recorded when the caller does not name one.
pub const DEFAULT_SOURCE: &str = "telegram_bot";

/// Provenance key stamped on creation.
pub const CREATED_VIA_KEY: &str = "created_via";

/// Provenance key stamped on every update.
pub const UPDATED_VIA_KEY: &str = "updated_via";

/// Provenance key recording the API version that last wrote the note.
pub const API_VERSION_KEY: &str = "api_version";

/// Value written to `created_via` / `updated_via`.
pub const VIA_API: &str = "api";

/// Value written to `api_version`.
pub const API_VERSION: &str = "v1";

// =============================================================================
// PAGINATION
// =============================================================================

/// Page size used when a list request does not specify one.
pub const PAGE_LIMIT: i64 = 20;

/// Largest page a single list request may return; larger limits are capped.
pub const PAGE_LIMIT_MAX: i64 = 100;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

// =============================================================================
// DATABASE
// =============================================================================

/// Per-call budget for a single Store round trip, in milliseconds.
pub const QUERY_TIMEOUT_MS: u64 = 5_000;

// =============================================================================
// SERVICE IDENTITY
// =============================================================================

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "mainote-backend";
