//! HTTP request handlers
//!
//! Implements the queue and playback control endpoints. Validation and load
//! failures come back as structured JSON errors so the hosting UI can render
//! them inline; previously queued tracks are never lost to a failed request.

use crate::api::AppContext;
use crate::error::Error;
use crate::registry::TrackInput;
use crate::state::PlaybackPhase;
use crate::track::{RepeatMode, Track, TrackId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct TrackDescriptor {
    pub file_path: String,
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub tracks: Vec<TrackDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct TrackInfo {
    pub id: TrackId,
    pub file_path: String,
    pub title: String,
    pub artist: Option<String>,
    /// Whether the source has been lazily resolved yet
    pub loaded: bool,
}

impl From<&Track> for TrackInfo {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            file_path: track.file_path.to_string_lossy().to_string(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            loaded: track.source.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub tracks: Vec<TrackInfo>,
}

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub data_url: String,
    /// Non-fatal oversize advisory
    pub advisory: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayRequest {
    #[serde(default)]
    pub track_id: Option<TrackId>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub track_id: TrackId,
}

#[derive(Debug, Default, Deserialize)]
pub struct EndedRequest {
    #[serde(default)]
    pub track_id: Option<TrackId>,
}

#[derive(Debug, Serialize)]
pub struct EndedResponse {
    /// Track the engine advanced to, if the repeat policy picked one
    pub advanced_to: Option<TrackId>,
}

#[derive(Debug, Serialize)]
pub struct RepeatResponse {
    pub repeat_mode: RepeatMode,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub active_id: Option<TrackId>,
    pub playing: bool,
    pub repeat_mode: RepeatMode,
    pub loading_id: Option<TrackId>,
    pub phase: PlaybackPhase,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub tracks: Vec<TrackInfo>,
}

/// Map engine errors to HTTP status + structured body
fn error_response(e: &Error) -> (StatusCode, Json<StatusResponse>) {
    let status = match e {
        Error::Validation { .. } | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        Error::TrackNotFound(_) => StatusCode::NOT_FOUND,
        Error::LoadInFlight(_) => StatusCode::CONFLICT,
        Error::InvalidState(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

// ============================================================================
// Track Endpoints
// ============================================================================

/// POST /tracks - Register a batch of track descriptors
///
/// All-or-nothing: a missing file rejects the whole batch, naming its
/// absolute path, and the queue is left unchanged.
pub async fn register_tracks(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, (StatusCode, Json<StatusResponse>)> {
    info!("Register request with {} tracks", req.tracks.len());

    let inputs: Vec<TrackInput> = req
        .tracks
        .into_iter()
        .map(|t| TrackInput {
            file_path: t.file_path,
            title: t.title,
            artist: t.artist,
        })
        .collect();

    match ctx.engine.enqueue(inputs).await {
        Ok(tracks) => Ok(Json(RegisterResponse {
            tracks: tracks.iter().map(TrackInfo::from).collect(),
        })),
        Err(e) => {
            error!("Failed to register tracks: {}", e);
            Err(error_response(&e))
        }
    }
}

/// POST /tracks/:track_id/load - Resolve a track's source lazily
///
/// Idempotent: a resolved track returns its cached data URL without touching
/// the filesystem.
pub async fn load_track(
    State(ctx): State<AppContext>,
    Path(track_id): Path<TrackId>,
) -> Result<Json<LoadResponse>, (StatusCode, Json<StatusResponse>)> {
    match ctx.engine.load(&track_id).await {
        Ok((data_url, advisory)) => Ok(Json(LoadResponse { data_url, advisory })),
        Err(e) => {
            error!("Failed to load track {}: {}", track_id, e);
            Err(error_response(&e))
        }
    }
}

// ============================================================================
// Playback Control Endpoints
// ============================================================================

/// POST /playback/play - Start playback (optionally of a specific track)
pub async fn play(
    State(ctx): State<AppContext>,
    body: Option<Json<PlayRequest>>,
) -> Result<StatusCode, (StatusCode, Json<StatusResponse>)> {
    let track_id = body.map(|Json(req)| req.track_id).unwrap_or(None);
    match ctx.engine.play(track_id).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(e) => {
            error!("Play failed: {}", e);
            Err(error_response(&e))
        }
    }
}

/// POST /playback/pause - Pause playback
pub async fn pause(
    State(ctx): State<AppContext>,
) -> Result<StatusCode, (StatusCode, Json<StatusResponse>)> {
    match ctx.engine.pause().await {
        Ok(()) => Ok(StatusCode::OK),
        Err(e) => Err(error_response(&e)),
    }
}

/// POST /playback/select - Select a track without starting playback
pub async fn select(
    State(ctx): State<AppContext>,
    Json(req): Json<SelectRequest>,
) -> Result<StatusCode, (StatusCode, Json<StatusResponse>)> {
    match ctx.engine.select(&req.track_id).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(e) => {
            error!("Select failed for {}: {}", req.track_id, e);
            Err(error_response(&e))
        }
    }
}

/// POST /playback/repeat - Cycle repeat mode (none -> playlist -> track)
pub async fn cycle_repeat(State(ctx): State<AppContext>) -> Json<RepeatResponse> {
    let repeat_mode = ctx.engine.cycle_repeat().await;
    Json(RepeatResponse { repeat_mode })
}

/// POST /playback/ended - Natural-end signal from the underlying player
pub async fn track_ended(
    State(ctx): State<AppContext>,
    body: Option<Json<EndedRequest>>,
) -> Result<Json<EndedResponse>, (StatusCode, Json<StatusResponse>)> {
    let track_id = body.map(|Json(req)| req.track_id).unwrap_or(None);
    match ctx.engine.track_ended(track_id).await {
        Ok(advanced_to) => Ok(Json(EndedResponse { advanced_to })),
        Err(e) => {
            error!("Ended signal failed: {}", e);
            Err(error_response(&e))
        }
    }
}

/// GET /playback/state - Current player state
pub async fn get_state(State(ctx): State<AppContext>) -> Json<StateResponse> {
    let player = ctx.state.player_snapshot().await;
    Json(StateResponse {
        phase: player.phase(),
        active_id: player.active_id,
        playing: player.playing,
        repeat_mode: player.repeat_mode,
        loading_id: player.loading_id,
    })
}

// ============================================================================
// Queue Endpoint
// ============================================================================

/// GET /queue - Ordered queue snapshot
pub async fn get_queue(State(ctx): State<AppContext>) -> Json<QueueResponse> {
    let tracks = ctx.engine.queue_snapshot().await;
    Json(QueueResponse {
        tracks: tracks.iter().map(TrackInfo::from).collect(),
    })
}
