//! Event types for the player event system
//!
//! Broadcast to SSE subscribers so an embedded player UI can mirror engine
//! state without polling.

use crate::track::{RepeatMode, TrackId};
use serde::{Deserialize, Serialize};

/// Player event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Queue contents changed (tracks appended after a merge)
    QueueChanged {
        queue_len: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track became the active selection (not necessarily playing)
    TrackSelected {
        track_id: TrackId,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playing/paused flipped
    PlaybackStateChanged {
        playing: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Lazy load started for a track
    TrackLoading {
        track_id: TrackId,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Lazy load finished; source is now resolved
    TrackLoaded {
        track_id: TrackId,
        /// Non-fatal oversize advisory, when the policy flagged the payload
        advisory: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Lazy load failed; source remains unresolved
    LoadFailed {
        track_id: TrackId,
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Repeat mode toggled
    RepeatModeChanged {
        mode: RepeatMode,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track reached its natural end
    TrackEnded {
        track_id: TrackId,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Event type string used as the SSE `event:` field
    pub fn type_str(&self) -> &'static str {
        match self {
            PlayerEvent::QueueChanged { .. } => "QueueChanged",
            PlayerEvent::TrackSelected { .. } => "TrackSelected",
            PlayerEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            PlayerEvent::TrackLoading { .. } => "TrackLoading",
            PlayerEvent::TrackLoaded { .. } => "TrackLoaded",
            PlayerEvent::LoadFailed { .. } => "LoadFailed",
            PlayerEvent::RepeatModeChanged { .. } => "RepeatModeChanged",
            PlayerEvent::TrackEnded { .. } => "TrackEnded",
        }
    }
}
