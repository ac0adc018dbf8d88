//! # cueplay
//!
//! Track-queue playback engine for an embedded audio player.
//!
//! **Purpose:** Validate and queue local audio tracks, resolve their playable
//! sources lazily (base64 data URLs, or range-endpoint URLs in stream mode),
//! run the play/pause/repeat state machine with automatic track advance, and
//! stream audio bytes over HTTP with byte-range support.
//!
//! The engine holds all state in memory for the lifetime of the process;
//! nothing is persisted across restarts.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod loader;
pub mod media;
pub mod playback;
pub mod queue;
pub mod registry;
pub mod state;
pub mod track;

pub use error::{Error, Result};
pub use state::SharedState;
