//! Playback engine components
//!
//! - `engine`: play/pause/select state machine and queue orchestration
//! - `advance`: repeat-mode policy for the natural-end signal

pub mod advance;
pub mod engine;

pub use engine::PlaybackEngine;
