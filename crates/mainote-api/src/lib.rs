//! mainote-api - HTTP API for the mainote note service

pub mod config;
pub mod error_handler;
pub mod extract;
pub mod handlers;
pub mod logging;
pub mod services;
pub mod wire;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::Request,
    routing::get,
    Router,
};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use mainote_core::NoteRepository;

use crate::services::NoteService;

/// Largest accepted request body; larger bodies fail JSON extraction.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// STATE & ROUTER
// =============================================================================

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub notes: NoteService,
}

impl AppState {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self {
            notes: NoteService::new(repo),
        }
    }
}

/// Build the application router with its middleware stack.
///
/// Error bodies written by the stack (timeouts, panics, oversized bodies)
/// go through the same classifier as handler errors.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    use handlers::{health, notes};

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .route("/api/v1/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/api/v1/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        // Middleware
        .layer(CatchPanicLayer::custom(error_handler::panic_response))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(error_handler::handle_stack_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
