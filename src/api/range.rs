//! Range file server
//!
//! Streams a local audio file's bytes, honoring single contiguous byte-range
//! requests so a player can seek without downloading the whole file. The
//! bytes pass through verbatim; no decoding happens here. Multi-range and
//! conditional requests are not supported.

use crate::media::mime_for_extension;
use axum::{
    body::Body,
    extract::Query,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// MIME type used when the extension is unrecognized
const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
pub struct AudioQuery {
    #[serde(default)]
    pub path: Option<String>,
}

/// GET /audio?path=<absolute path> - Stream a local file
///
/// - Missing `path` parameter: 400
/// - Nonexistent file: 404
/// - No `Range` header: 200 with the full content
/// - `Range: bytes=<start>-<end>`: 206 with the byte slice; `end` defaults
///   to the last byte. Malformed or unsatisfiable ranges: 400.
pub async fn serve_audio(Query(query): Query<AudioQuery>, headers: HeaderMap) -> Response {
    let Some(path) = query.path else {
        return (StatusCode::BAD_REQUEST, "missing path query parameter").into_response();
    };
    let path = PathBuf::from(path);

    let meta = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => meta,
        _ => {
            debug!("Audio request for nonexistent file: {}", path.display());
            return (StatusCode::NOT_FOUND, "file not found").into_response();
        }
    };
    let size = meta.len();
    let mime = mime_for_extension(&path).unwrap_or(FALLBACK_MIME);

    let range_header = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let mut file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            warn!("Failed to open {}: {}", path.display(), e);
            return (StatusCode::NOT_FOUND, "file not found").into_response();
        }
    };

    match range_header {
        None => {
            // Full content
            let stream = ReaderStream::new(file);
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime)
                .header(header::CONTENT_LENGTH, size)
                .header(header::ACCEPT_RANGES, "bytes")
                .body(Body::from_stream(stream))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Some(raw) => {
            let Some((start, end)) = parse_range(raw, size) else {
                debug!("Rejected range header {:?} for size {}", raw, size);
                return (StatusCode::BAD_REQUEST, "malformed range").into_response();
            };

            if let Err(e) = file.seek(SeekFrom::Start(start)).await {
                warn!("Seek failed on {}: {}", path.display(), e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }

            let len = end - start + 1;
            let stream = ReaderStream::new(file.take(len));
            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, mime)
                .header(header::CONTENT_LENGTH, len)
                .header(header::ACCEPT_RANGES, "bytes")
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end, size),
                )
                .body(Body::from_stream(stream))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

/// Parse a `bytes=<start>-<end>` header against a file size.
///
/// `start` is required; `end` defaults to the last byte and is clamped to
/// it. Returns None for anything malformed or unsatisfiable: suffix ranges,
/// multi-range lists, start past the end of the file, or start > end.
fn parse_range(raw: &str, size: u64) -> Option<(u64, u64)> {
    let spec = raw.strip_prefix("bytes=")?;
    if spec.contains(',') {
        return None; // Single contiguous range only
    }

    let (start_str, end_str) = spec.split_once('-')?;
    let start: u64 = start_str.trim().parse().ok()?;

    let end = match end_str.trim() {
        "" => size.checked_sub(1)?,
        text => text.parse::<u64>().ok()?.min(size.saturating_sub(1)),
    };

    if start > end || start >= size {
        return None;
    }
    Some((start, end))
}
