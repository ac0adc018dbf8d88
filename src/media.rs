//! MIME type lookup for audio file extensions

use std::path::Path;

/// Map a file extension to its audio MIME type.
///
/// Returns None for unrecognized extensions; callers pick their own default
/// (`audio/mpeg` for data URLs, `application/octet-stream` for HTTP bodies).
pub fn mime_for_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "ogg" | "oga" => Some("audio/ogg"),
        "opus" => Some("audio/opus"),
        "flac" => Some("audio/flac"),
        "m4a" | "mp4" => Some("audio/mp4"),
        "aac" => Some("audio/aac"),
        "webm" => Some("audio/webm"),
        _ => None,
    }
}
