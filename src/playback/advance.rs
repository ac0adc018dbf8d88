//! Auto-advance policy
//!
//! Pure function deciding what plays after a track's natural end, kept
//! separate from engine state so the repeat semantics are testable on their
//! own.

use crate::queue::Queue;
use crate::track::{RepeatMode, TrackId};

/// Pick the track to load-and-play after `ended` finishes.
///
/// - `Track`: None. Looping the current track is the player's native loop
///   flag, not an advance.
/// - `None`: the following track in queue order, or None when `ended` was
///   last (playback stops).
/// - `Playlist`: the following track, wrapping from the last entry back to
///   the first.
///
/// An `ended` id that is no longer in the queue yields None.
pub fn next_track(queue: &Queue, ended: &TrackId, mode: RepeatMode) -> Option<TrackId> {
    if mode == RepeatMode::Track {
        return None;
    }

    let position = queue.position(ended)?;
    let tracks = queue.tracks();

    match tracks.get(position + 1) {
        Some(next) => Some(next.id.clone()),
        None => match mode {
            RepeatMode::Playlist => tracks.first().map(|t| t.id.clone()),
            _ => None,
        },
    }
}
