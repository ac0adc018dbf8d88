//! Error types for cueplay
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use crate::track::TrackId;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cueplay
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Track registration failed validation (file missing or unreadable)
    ///
    /// Rejects the whole batch; names the first offending absolute path.
    #[error("Audio file not found or unreadable: {path}")]
    Validation { path: PathBuf },

    /// Lazy load failed (file vanished between registration and playback)
    #[error("Failed to load audio from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// Referenced track is not in the queue
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Another lazy load is already in flight
    #[error("A load is already in progress for track {0}")]
    LoadInFlight(TrackId),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using cueplay Error
pub type Result<T> = std::result::Result<T, Error>;
