//! Queue projection
//!
//! Ordered track queue where insertion order is playback order. Merging is a
//! pure function so the dedup rule stays independently testable.

use crate::track::{Track, TrackId, TrackSource};
use std::collections::HashSet;

/// Merge incoming tracks into the existing queue, deduplicated by id.
///
/// Entries whose id is already present are dropped; the rest are appended in
/// their incoming order. Existing entries are never reordered or replaced,
/// which makes the merge idempotent.
pub fn merge(existing: Vec<Track>, incoming: Vec<Track>) -> Vec<Track> {
    let present: HashSet<TrackId> = existing.iter().map(|t| t.id.clone()).collect();
    let mut merged = existing;
    for track in incoming {
        if !present.contains(&track.id) {
            merged.push(track);
        }
    }
    merged
}

/// Ordered, deduplicated track queue for one session
#[derive(Debug, Default)]
pub struct Queue {
    tracks: Vec<Track>,
}

impl Queue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    /// Merge new tracks in, returning how many were appended
    pub fn merge_in(&mut self, incoming: Vec<Track>) -> usize {
        let before = self.tracks.len();
        let existing = std::mem::take(&mut self.tracks);
        self.tracks = merge(existing, incoming);
        self.tracks.len() - before
    }

    /// All tracks in playback order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Look up a track by id
    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    /// Queue position of a track
    pub fn position(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    /// First track in playback order
    pub fn first(&self) -> Option<&Track> {
        self.tracks.first()
    }

    /// Set a track's resolved source.
    ///
    /// Sources only transition unresolved -> resolved; a second write for the
    /// same track is ignored so the cached source is never clobbered.
    pub fn set_source(&mut self, id: &TrackId, source: TrackSource) -> bool {
        match self.tracks.iter_mut().find(|t| &t.id == id) {
            Some(track) if track.source.is_none() => {
                track.source = Some(source);
                true
            }
            _ => false,
        }
    }
}
