//! Shared playback state
//!
//! Thread-safe shared state for playback coordination between the engine,
//! HTTP handlers, and the SSE broadcaster.

use crate::error::{Error, Result};
use crate::events::PlayerEvent;
use crate::track::{RepeatMode, TrackId};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

/// Coarse playback phase derived from the player fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    /// No active track
    Idle,
    /// Active track selected, not playing
    Ready,
    /// Active track's source is being resolved
    Loading,
    /// Active track is playing
    Playing,
}

/// Mutable per-session player state
///
/// Invariants:
/// - `loading_id`, if set, references a track whose source is unresolved
/// - `playing` is never true while the active track's source is unresolved
#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    /// Id of the track considered "current"
    pub active_id: Option<TrackId>,

    /// Whether the active track is playing
    pub playing: bool,

    /// Policy for what plays after the current track ends
    pub repeat_mode: RepeatMode,

    /// Track currently being lazily loaded (at most one at a time)
    pub loading_id: Option<TrackId>,
}

impl PlayerState {
    /// Derive the coarse phase for status reporting
    pub fn phase(&self) -> PlaybackPhase {
        match &self.active_id {
            None => PlaybackPhase::Idle,
            Some(_) if self.playing => PlaybackPhase::Playing,
            Some(_) if self.loading_id.is_some() => PlaybackPhase::Loading,
            Some(_) => PlaybackPhase::Ready,
        }
    }
}

/// Shared state accessible by all components
///
/// Uses RwLock for concurrent read access with rare writes.
pub struct SharedState {
    /// Player state (active/playing/repeat/loading)
    pub player: RwLock<PlayerState>,

    /// Event broadcaster for SSE events
    pub event_tx: broadcast::Sender<PlayerEvent>,
}

impl SharedState {
    /// Create new shared state with default values
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100); // Buffer up to 100 events
        Self {
            player: RwLock::new(PlayerState::default()),
            event_tx,
        }
    }

    /// Broadcast an event to all SSE listeners
    pub fn broadcast_event(&self, event: PlayerEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to event stream for SSE
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_tx.subscribe()
    }

    /// Snapshot the player state
    pub async fn player_snapshot(&self) -> PlayerState {
        self.player.read().await.clone()
    }

    /// Mark a track as the sole in-flight load.
    ///
    /// Fails with `LoadInFlight` if any load (same track or another) is
    /// already outstanding.
    pub async fn begin_load(&self, track_id: &TrackId) -> Result<()> {
        let mut player = self.player.write().await;
        if let Some(loading) = &player.loading_id {
            return Err(Error::LoadInFlight(loading.clone()));
        }
        player.loading_id = Some(track_id.clone());
        Ok(())
    }

    /// Release the in-flight load guard.
    ///
    /// Must run on both success and failure paths of a load.
    pub async fn finish_load(&self) {
        self.player.write().await.loading_id = None;
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_are_idle() {
        let state = SharedState::new();
        let player = state.player_snapshot().await;
        assert!(player.active_id.is_none());
        assert!(!player.playing);
        assert_eq!(player.repeat_mode, RepeatMode::None);
        assert!(player.loading_id.is_none());
        assert_eq!(player.phase(), PlaybackPhase::Idle);
    }

    #[tokio::test]
    async fn load_guard_is_single_flight() {
        let state = SharedState::new();
        let a = TrackId::from("1-0-0");
        let b = TrackId::from("1-0-1");

        state.begin_load(&a).await.unwrap();

        // A second load for any track is rejected while one is outstanding
        let err = state.begin_load(&b).await.unwrap_err();
        assert!(matches!(err, Error::LoadInFlight(id) if id == a));

        // Releasing the guard allows the next load
        state.finish_load().await;
        state.begin_load(&b).await.unwrap();
    }

    #[tokio::test]
    async fn phase_tracks_player_fields() {
        let state = SharedState::new();
        let id = TrackId::from("1-0-0");

        {
            let mut player = state.player.write().await;
            player.active_id = Some(id.clone());
        }
        assert_eq!(state.player_snapshot().await.phase(), PlaybackPhase::Ready);

        state.begin_load(&id).await.unwrap();
        assert_eq!(state.player_snapshot().await.phase(), PlaybackPhase::Loading);

        state.finish_load().await;
        {
            let mut player = state.player.write().await;
            player.playing = true;
        }
        assert_eq!(state.player_snapshot().await.phase(), PlaybackPhase::Playing);
    }
}
