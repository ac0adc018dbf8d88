//! Playback engine orchestration
//!
//! Owns the queue and the play/pause/select state machine. Coordinates track
//! registration, the lazy loader, auto-advance, and event broadcasting.
//!
//! State machine, derived from the player fields:
//! - `Idle`: no active track
//! - `Ready`: active track selected, not playing
//! - `Loading`: active track's source being resolved (single-flight)
//! - `Playing`: active track playing; its source is always resolved
//!
//! A play request on an unresolved track goes through `Loading` and starts
//! playing once the resolve finishes, so `Playing` with a null source is
//! never observable: selection and the playing flag only commit after the
//! resolve, and a request rejected by the single-flight guard leaves the
//! player state untouched.

use crate::config::{AdvisoryConfig, SourceMode};
use crate::error::{Error, Result};
use crate::events::PlayerEvent;
use crate::loader::LazyLoader;
use crate::playback::advance;
use crate::queue::Queue;
use crate::registry::{TrackInput, TrackRegistry};
use crate::state::SharedState;
use crate::track::{RepeatMode, Track, TrackId};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Playback engine - orchestrates registry, queue, loader, and player state
pub struct PlaybackEngine {
    /// Identity assignment and batch validation
    registry: TrackRegistry,

    /// Read-and-encode for lazy source resolution
    loader: LazyLoader,

    /// Ordered track queue
    queue: Arc<RwLock<Queue>>,

    /// Shared player state and event bus
    state: Arc<SharedState>,
}

impl PlaybackEngine {
    /// Create a new engine with an empty queue
    pub fn new(state: Arc<SharedState>, advisory: AdvisoryConfig, mode: SourceMode) -> Self {
        Self {
            registry: TrackRegistry::new(),
            loader: LazyLoader::new(advisory, mode),
            queue: Arc::new(RwLock::new(Queue::new())),
            state,
        }
    }

    /// Shared state handle
    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Snapshot the queue in playback order
    pub async fn queue_snapshot(&self) -> Vec<Track> {
        self.queue.read().await.tracks().to_vec()
    }

    /// Register a batch of track descriptors and merge them into the queue.
    ///
    /// All-or-nothing: a validation failure leaves the queue untouched. When
    /// nothing was active, the first new track becomes the selection (without
    /// starting playback or loading anything).
    pub async fn enqueue(&self, inputs: Vec<TrackInput>) -> Result<Vec<Track>> {
        let tracks = self.registry.register_batch(inputs).await?;

        let queue_len = {
            let mut queue = self.queue.write().await;
            let appended = queue.merge_in(tracks.clone());
            debug!("Merged batch: {} appended, queue now {}", appended, queue.len());
            queue.len()
        };

        self.state.broadcast_event(PlayerEvent::QueueChanged {
            queue_len,
            timestamp: chrono::Utc::now(),
        });

        // Auto-select the first new track only if nothing is active
        if let Some(first) = tracks.first() {
            let mut player = self.state.player.write().await;
            if player.active_id.is_none() {
                player.active_id = Some(first.id.clone());
                drop(player);
                info!("Auto-selected first track {}", first.id);
                self.state.broadcast_event(PlayerEvent::TrackSelected {
                    track_id: first.id.clone(),
                    timestamp: chrono::Utc::now(),
                });
            }
        }

        Ok(tracks)
    }

    /// Select a track without starting playback.
    ///
    /// Resolves the source when it is still null; playback state stays
    /// paused either way. The selection commits only after the resolve
    /// succeeds, so a request rejected by the single-flight guard (or a
    /// failed load) leaves the player state exactly as it found it.
    pub async fn select(&self, track_id: &TrackId) -> Result<()> {
        self.ensure_in_queue(track_id).await?;
        self.resolve_source(track_id).await?;

        let mut player = self.state.player.write().await;
        let was_playing = player.playing;
        player.active_id = Some(track_id.clone());
        player.playing = false;
        drop(player);

        self.state.broadcast_event(PlayerEvent::TrackSelected {
            track_id: track_id.clone(),
            timestamp: chrono::Utc::now(),
        });
        if was_playing {
            self.state.broadcast_event(PlayerEvent::PlaybackStateChanged {
                playing: false,
                timestamp: chrono::Utc::now(),
            });
        }
        Ok(())
    }

    /// Start playback.
    ///
    /// With no explicit id, plays the active track, falling back to the first
    /// queued track. Goes through the loading path when the source is
    /// unresolved; the play intent is honored once the resolve finishes.
    ///
    /// Selection and the playing flag commit together, after the resolve,
    /// in one critical section. Sources never transition back to null, so
    /// `playing == true` always points at a resolved track, no matter how
    /// concurrent play/select requests interleave.
    pub async fn play(&self, track_id: Option<TrackId>) -> Result<()> {
        let target = match track_id {
            Some(id) => id,
            None => self.default_play_target().await?,
        };
        self.ensure_in_queue(&target).await?;
        self.resolve_source(&target).await?;

        let mut player = self.state.player.write().await;
        let changed = player.active_id.as_ref() != Some(&target);
        let was_playing = player.playing;
        player.active_id = Some(target.clone());
        player.playing = true;
        drop(player);

        if changed {
            self.state.broadcast_event(PlayerEvent::TrackSelected {
                track_id: target.clone(),
                timestamp: chrono::Utc::now(),
            });
        }
        if !was_playing {
            info!("Playing track {}", target);
            self.state.broadcast_event(PlayerEvent::PlaybackStateChanged {
                playing: true,
                timestamp: chrono::Utc::now(),
            });
        }
        Ok(())
    }

    /// Pause playback
    pub async fn pause(&self) -> Result<()> {
        let mut player = self.state.player.write().await;
        if player.playing {
            player.playing = false;
            drop(player);
            info!("Paused");
            self.state.broadcast_event(PlayerEvent::PlaybackStateChanged {
                playing: false,
                timestamp: chrono::Utc::now(),
            });
        }
        Ok(())
    }

    /// Cycle the repeat mode in fixed order `none -> playlist -> track -> none`
    pub async fn cycle_repeat(&self) -> RepeatMode {
        let mode = {
            let mut player = self.state.player.write().await;
            player.repeat_mode = player.repeat_mode.cycle();
            player.repeat_mode
        };
        info!("Repeat mode is now {:?}", mode);
        self.state.broadcast_event(PlayerEvent::RepeatModeChanged {
            mode,
            timestamp: chrono::Utc::now(),
        });
        mode
    }

    /// Handle the natural-end signal from the underlying player.
    ///
    /// Reads the current queue snapshot, so late queue additions are seen.
    /// In `track` repeat mode the native loop flag owns looping and this is a
    /// no-op. Otherwise the repeat policy picks the next track, which is
    /// loaded and played; when nothing follows, playback stops.
    ///
    /// Returns the id that was advanced to, if any.
    pub async fn track_ended(&self, track_id: Option<TrackId>) -> Result<Option<TrackId>> {
        let (ended, mode) = {
            let player = self.state.player.read().await;
            (track_id.or_else(|| player.active_id.clone()), player.repeat_mode)
        };

        let Some(ended) = ended else {
            return Err(Error::InvalidState("no track was active".into()));
        };

        if mode == RepeatMode::Track {
            debug!("Track {} ended with track-repeat; native loop owns it", ended);
            return Ok(None);
        }

        self.state.broadcast_event(PlayerEvent::TrackEnded {
            track_id: ended.clone(),
            timestamp: chrono::Utc::now(),
        });

        let next = {
            let queue = self.queue.read().await;
            advance::next_track(&queue, &ended, mode)
        };

        match next {
            Some(next_id) => {
                info!("Auto-advancing from {} to {}", ended, next_id);
                self.play(Some(next_id.clone())).await?;
                Ok(Some(next_id))
            }
            None => {
                let mut player = self.state.player.write().await;
                if player.playing {
                    player.playing = false;
                    drop(player);
                    self.state.broadcast_event(PlayerEvent::PlaybackStateChanged {
                        playing: false,
                        timestamp: chrono::Utc::now(),
                    });
                }
                debug!("Track {} ended with nothing to advance to", ended);
                Ok(None)
            }
        }
    }

    /// Resolve a track's source and return the playable URL.
    ///
    /// Idempotent: a resolved track returns its cached source without
    /// touching the filesystem. Also returns the oversize advisory when the
    /// load tripped it.
    pub async fn load(&self, track_id: &TrackId) -> Result<(String, Option<String>)> {
        let advisory = self.resolve_source(track_id).await?;
        let queue = self.queue.read().await;
        let track = queue
            .get(track_id)
            .ok_or_else(|| Error::TrackNotFound(track_id.clone()))?;
        let source = track
            .source
            .as_ref()
            .ok_or_else(|| Error::InvalidState(format!("track {} has no source", track_id)))?;
        Ok((source.url().to_string(), advisory))
    }

    /// Resolve the source for a track if it is still null.
    ///
    /// Single-flight: while one load is outstanding, requests for any track
    /// are rejected with `LoadInFlight`. The guard is released on success and
    /// failure alike; on failure the source stays null so the next play
    /// attempt retries.
    async fn resolve_source(&self, track_id: &TrackId) -> Result<Option<String>> {
        let file_path = {
            let queue = self.queue.read().await;
            let track = queue
                .get(track_id)
                .ok_or_else(|| Error::TrackNotFound(track_id.clone()))?;
            if track.source.is_some() {
                return Ok(None); // Already resolved
            }
            track.file_path.clone()
        };

        self.state.begin_load(track_id).await?;
        self.state.broadcast_event(PlayerEvent::TrackLoading {
            track_id: track_id.clone(),
            timestamp: chrono::Utc::now(),
        });

        match self.loader.resolve(&file_path).await {
            Ok(resolved) => {
                {
                    let mut queue = self.queue.write().await;
                    queue.set_source(track_id, resolved.source);
                }
                self.state.finish_load().await;
                self.state.broadcast_event(PlayerEvent::TrackLoaded {
                    track_id: track_id.clone(),
                    advisory: resolved.advisory.clone(),
                    timestamp: chrono::Utc::now(),
                });
                Ok(resolved.advisory)
            }
            Err(e) => {
                // Guard must clear on the failure path too
                self.state.finish_load().await;
                warn!("Load failed for {}: {}", track_id, e);
                self.state.broadcast_event(PlayerEvent::LoadFailed {
                    track_id: track_id.clone(),
                    reason: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                Err(e)
            }
        }
    }

    /// Target for a bare play request: active track, else first in queue
    async fn default_play_target(&self) -> Result<TrackId> {
        if let Some(active) = self.state.player.read().await.active_id.clone() {
            return Ok(active);
        }
        self.queue
            .read()
            .await
            .first()
            .map(|t| t.id.clone())
            .ok_or_else(|| Error::InvalidState("queue is empty".into()))
    }

    async fn ensure_in_queue(&self, track_id: &TrackId) -> Result<()> {
        if self.queue.read().await.get(track_id).is_none() {
            return Err(Error::TrackNotFound(track_id.clone()));
        }
        Ok(())
    }
}
