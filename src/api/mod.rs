//! HTTP API for the playback engine
//!
//! Axum router exposing queue/playback control, the lazy-load endpoint, the
//! SSE event stream, and the range file server. CORS is permissive; the
//! service is meant to sit next to a local player UI.

pub mod handlers;
pub mod range;
pub mod sse;

use crate::playback::PlaybackEngine;
use crate::state::SharedState;
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    /// Playback engine
    pub engine: Arc<PlaybackEngine>,
    /// Shared player state and event bus
    pub state: Arc<SharedState>,
}

/// Create the API router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Track registration and lazy loading
        .route("/tracks", post(handlers::register_tracks))
        .route("/tracks/:track_id/load", post(handlers::load_track))

        // Playback control
        .route("/playback/play", post(handlers::play))
        .route("/playback/pause", post(handlers::pause))
        .route("/playback/select", post(handlers::select))
        .route("/playback/repeat", post(handlers::cycle_repeat))
        .route("/playback/ended", post(handlers::track_ended))
        .route("/playback/state", get(handlers::get_state))

        // Queue snapshot
        .route("/queue", get(handlers::get_queue))

        // SSE event stream
        .route("/events", get(sse::event_stream))

        // Range file server
        .route("/audio", get(range::serve_audio))

        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "cueplay",
        "version": env!("CARGO_PKG_VERSION"),
        "queue_len": ctx.engine.queue_snapshot().await.len(),
    }))
}
