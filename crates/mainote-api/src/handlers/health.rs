//! Liveness endpoint.

use axum::Json;
use chrono::Utc;

use mainote_core::defaults;

use crate::wire::HealthResponse;

/// Service version reported by the health endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: VERSION.to_string(),
        service: defaults::SERVICE_NAME.to_string(),
    })
}
