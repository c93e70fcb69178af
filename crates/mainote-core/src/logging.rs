//! Structured logging conventions for mainote.
//!
//! Every event carries `subsystem` (one of the values below), `component`
//! and, where one applies, `op`. Entity fields are `note_id` and
//! `owner_key`; measurements are `duration_ms`, `result_count`, `pool_size`
//! and `pool_idle`. The request span adds `method`, `uri` and `request_id`.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Internal failures surfaced as 5xx (store, encoding, decoding, timeouts) |
//! | WARN  | Client failures surfaced as 4xx, failed store calls, pool pressure |
//! | INFO  | Lifecycle events (startup, shutdown), note creation/deletion |
//! | DEBUG | Store round trips, pagination decisions |

/// HTTP layer: routing, extraction, error responses.
pub const SUBSYSTEM_API: &str = "api";

/// Note business rules.
pub const SUBSYSTEM_SERVICE: &str = "service";

/// Pool and Store.
pub const SUBSYSTEM_DB: &str = "db";
