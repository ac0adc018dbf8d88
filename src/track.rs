//! Track types shared across the engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Stable track identity, assigned at registration.
///
/// Formatted as `<batch-timestamp-millis>-<batch-seq>-<index>` so ids never
/// collide across repeated submissions within the same process lifetime.
/// Never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        TrackId(s.to_string())
    }
}

/// Resolved playable reference for a track
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TrackSource {
    /// Inline audio bytes as a base64 data URL
    DataUrl(String),
    /// URL served by the range file server
    StreamUrl(String),
}

impl TrackSource {
    /// The URL string a player can hand to its audio element
    pub fn url(&self) -> &str {
        match self {
            TrackSource::DataUrl(url) | TrackSource::StreamUrl(url) => url,
        }
    }
}

/// One queueable audio item
///
/// `source` starts as None and transitions to Some exactly once, when the
/// lazy loader resolves it. It never goes back to None.
#[derive(Debug, Clone)]
pub struct Track {
    /// Stable identity, unique within the queue's lifetime
    pub id: TrackId,

    /// Absolute path to the local audio file
    pub file_path: PathBuf,

    /// Display title
    pub title: String,

    /// Optional display artist
    pub artist: Option<String>,

    /// Resolved playable source; None means "not yet loaded"
    pub source: Option<TrackSource>,
}

/// What plays after the current track ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop after the last track
    #[default]
    None,
    /// Wrap from the last track back to the first
    Playlist,
    /// Loop the current track (delegated to the player's native loop flag)
    Track,
}

impl RepeatMode {
    /// Advance to the next mode in the fixed toggle order
    /// `none -> playlist -> track -> none`.
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::None => RepeatMode::Playlist,
            RepeatMode::Playlist => RepeatMode::Track,
            RepeatMode::Track => RepeatMode::None,
        }
    }
}
